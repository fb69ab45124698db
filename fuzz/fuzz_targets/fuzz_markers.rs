// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use olhos::classifier::{detect_level, render_prompt, ClassificationResult};

#[derive(Arbitrary, Debug)]
struct Input {
    reply: String,
    camera: String,
    scenario: String,
}

fuzz_target!(|input: Input| {
    let result = ClassificationResult::from_text(input.reply.clone());
    assert_eq!(result.level, detect_level(&input.reply));
    if let Some(level) = result.level {
        assert!(level.is_escalated());
    }
    let summary = result.summary();
    assert!(!summary.contains('\n'));

    let _ = render_prompt("{camera}: {scenario}", &input.camera, &input.scenario);
});
