// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Page templates for the dashboard

use minijinja::Environment;

use crate::Result;

const BASE: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}{% endblock %} - Olhos da Lei</title>
    <style>
        :root {
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --bg-card: #0f3460;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --success: #00d9a5;
            --warning: #f5a623;
            --border: #2a2a4a;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }
        .container { max-width: 1400px; margin: 0 auto; padding: 20px; }
        nav {
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }
        nav .logo { font-size: 1.5em; font-weight: bold; color: var(--accent); text-decoration: none; }
        nav a { color: var(--text-secondary); text-decoration: none; }
        nav a:hover { color: var(--text-primary); }
        .card { background: var(--bg-card); border-radius: 12px; padding: 20px; margin-bottom: 20px; }
        .card h2 { margin-bottom: 15px; color: var(--accent); }
        .stats-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px;
            margin-bottom: 30px;
        }
        .stat-card { background: var(--bg-card); border-radius: 12px; padding: 20px; text-align: center; }
        .stat-card .number { font-size: 2.5em; font-weight: bold; color: var(--accent); }
        .stat-card .label { color: var(--text-secondary); font-size: 0.9em; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 12px; text-align: left; border-bottom: 1px solid var(--border); }
        th { color: var(--text-secondary); font-weight: 500; }
        .level-2 { color: var(--warning); font-weight: bold; }
        .level-3 { color: var(--accent); font-weight: bold; }
        .flash { border-left: 4px solid var(--success); }
        input, select, textarea, button {
            background: var(--bg-secondary);
            color: var(--text-primary);
            border: 1px solid var(--border);
            border-radius: 6px;
            padding: 6px 10px;
        }
        button { cursor: pointer; border-color: var(--accent); }
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">👁️ Olhos da Lei</a>
        <a href="/">Painel</a>
        <a href="/incidents">Ocorrências</a>
        <a href="/roster">Cães-Robôs</a>
        <a href="/reports">Relatórios</a>
        <a href="/settings">Configurações</a>
    </nav>
    <main class="container">
        {% if flash %}<div class="card flash">{{ flash }}</div>{% endif %}
        {% block content %}{% endblock %}
    </main>
</body>
</html>"#;

const INDEX: &str = r#"{% extends "base.html" %}
{% block title %}Painel{% endblock %}
{% block content %}
<h1>Painel de Monitoramento</h1>
<div class="stats-grid">
    <div class="stat-card"><div class="number">{{ stats.total_incidents }}</div><div class="label">Ocorrências</div></div>
    <div class="stat-card"><div class="number">{{ stats.pending_incidents }}</div><div class="label">Pendentes</div></div>
    <div class="stat-card"><div class="number">{{ stats.available_units }}/{{ stats.total_units }}</div><div class="label">Unidades disponíveis</div></div>
</div>
<div style="display: grid; grid-template-columns: 2fr 1fr; gap: 20px;">
    <div class="card">
        <h2>Análise de Câmera</h2>
        <form method="post" action="/classify">
            <p><select name="source">
                {% for camera in cameras %}<option value="{{ camera.id }}">{{ camera.label }}</option>{% endfor %}
            </select></p>
            <p><textarea name="scenario" rows="3" cols="60" placeholder="Descreva a situação observada"></textarea></p>
            <p><button type="submit">Analisar com IA</button></p>
        </form>
    </div>
    <div class="card">
        <h2>Unidades</h2>
        <table>
            <tr><th>Unidade</th><th>Status</th></tr>
            {% for unit in roster %}<tr><td>{{ unit.name }}</td><td>{{ unit.status }}</td></tr>{% endfor %}
        </table>
    </div>
</div>
<div class="card">
    <h2>Ocorrências Pendentes</h2>
    {% include "incident_table.html" %}
</div>
{% endblock %}"#;

const INCIDENT_TABLE: &str = r#"{% if incidents %}
<table>
    <tr><th>#</th><th>Descrição</th><th>Nível</th><th>Origem</th><th>Horário</th><th>Local</th><th>Status</th><th></th></tr>
    {% for incident in incidents %}
    <tr>
        <td>{{ incident.id }}</td>
        <td>{{ incident.description }}</td>
        <td class="level-{{ incident.level }}">{{ incident.level }}</td>
        <td>{{ incident.source }}</td>
        <td>{{ incident.time }}</td>
        <td>{{ incident.lat }}, {{ incident.lon }}</td>
        <td>{{ incident.status }}</td>
        <td>{% if incident.pending %}
            <form method="post" action="/incidents/{{ incident.id }}/action">
                <select name="label">{% for action in actions %}<option>{{ action }}</option>{% endfor %}</select>
                <button type="submit">Executar</button>
            </form>
        {% endif %}</td>
    </tr>
    {% endfor %}
</table>
{% else %}
<p>Nenhuma ocorrência.</p>
{% endif %}"#;

const INCIDENTS: &str = r#"{% extends "base.html" %}
{% block title %}Ocorrências{% endblock %}
{% block content %}
<h1>Mapa de Ocorrências</h1>
<div class="card">
    <p>Referência do mapa: {{ reference }}</p>
    {% include "incident_table.html" %}
    <form method="post" action="/incidents/clear" style="margin-top: 20px;">
        <button type="submit">Limpar ocorrências</button>
    </form>
</div>
{% endblock %}"#;

const ROSTER: &str = r#"{% extends "base.html" %}
{% block title %}Cães-Robôs{% endblock %}
{% block content %}
<h1>Integração com Cães-Robôs</h1>
<div class="card">
    <table>
        <tr><th>Unidade</th><th>Bateria</th><th>Status</th><th>Localização</th><th></th></tr>
        {% for unit in roster %}
        <tr>
            <td>{{ unit.name }}</td>
            <td>{{ unit.battery }}%</td>
            <td>{{ unit.status }}</td>
            <td>{{ unit.location }}</td>
            <td><form method="post" action="/roster/{{ unit.name }}/recall"><button type="submit">Retornar à base</button></form></td>
        </tr>
        {% endfor %}
    </table>
</div>
{% endblock %}"#;

const REPORTS: &str = r#"{% extends "base.html" %}
{% block title %}Relatórios{% endblock %}
{% block content %}
<h1>Relatórios Detalhados</h1>
<div class="card">
    <form method="get" action="/reports">
        <select name="kind">
            {% for k in kinds %}<option value="{{ k.value }}"{% if k.value == selected %} selected{% endif %}>{{ k.title }}</option>{% endfor %}
        </select>
        <input type="date" name="from" value="{{ date_from or '' }}">
        <input type="date" name="to" value="{{ date_to or '' }}">
        <button type="submit">Gerar Relatório</button>
    </form>
</div>
<div class="card">
    <h2>{{ title }}</h2>
    <table>
        {% for row in rows %}<tr><td>{{ row[0] }}</td><td>{{ row[1] }}</td></tr>{% endfor %}
    </table>
</div>
{% endblock %}"#;

const SETTINGS: &str = r#"{% extends "base.html" %}
{% block title %}Configurações{% endblock %}
{% block content %}
<h1>Configurações de Alerta</h1>
<div class="card">
    <form method="post" action="/settings">
        <p><label><input type="checkbox" name="email_level1"{% if alerts.email_level1 %} checked{% endif %}> Ativar alertas por e-mail para Nível 1</label></p>
        <p><label><input type="checkbox" name="sms_level2"{% if alerts.sms_level2 %} checked{% endif %}> Ativar alertas por SMS para Nível 2</label></p>
        <p><label><input type="checkbox" name="auto_dispatch_level3"{% if alerts.auto_dispatch_level3 %} checked{% endif %}> Acionar Cães-Robôs automaticamente para Nível 3</label></p>
        <p>E-mails (separados por vírgula):<br><input name="emails" size="60" value="{{ alerts.emails | join(', ') }}"></p>
        <p>Números de SMS (separados por vírgula):<br><input name="sms_numbers" size="60" value="{{ alerts.sms_numbers | join(', ') }}"></p>
        <p><button type="submit">Salvar Configurações de Alerta</button></p>
    </form>
</div>
<div class="card">
    <h2>Motor de IA</h2>
    <table>
        <tr><td>Provedor</td><td>{{ engine.provider }}</td></tr>
        <tr><td>Modelo</td><td>{{ engine.model }}</td></tr>
        <tr><td>URL</td><td>{{ engine.url }}</td></tr>
        <tr><td>Timeout</td><td>{{ engine.timeout_secs }}s</td></tr>
    </table>
</div>
{% endblock %}"#;

/// Build the template environment used by every page handler
pub fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("base.html", BASE)?;
    env.add_template("incident_table.html", INCIDENT_TABLE)?;
    env.add_template("index.html", INDEX)?;
    env.add_template("incidents.html", INCIDENTS)?;
    env.add_template("roster.html", ROSTER)?;
    env.add_template("reports.html", REPORTS)?;
    env.add_template("settings.html", SETTINGS)?;
    Ok(env)
}
