//! Server-rendered HTML for the landing and reflection pages.

use crate::drawing::BrushPalette;
use crate::models::SessionView;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `Response {n}: {text}` lines separated by `<br>`.
pub fn format_reflection(responses: &[String]) -> String {
    responses
        .iter()
        .enumerate()
        .map(|(i, response)| format!("Response {}: {}", i + 1, escape_html(response)))
        .collect::<Vec<_>>()
        .join("<br>")
}

fn palette_buttons() -> String {
    BrushPalette::entries()
        .iter()
        .map(|c| {
            format!(
                r#"<button type="button" class="swatch" title="{name}" data-color="{hex}" style="background:{hex}"></button>"#,
                name = c.name,
                hex = c.hex
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_landing(view: &SessionView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Emotion Canvas</title>
<style>
body {{ font-family: Helvetica, sans-serif; background: #f0f8ff; margin: 20px; }}
#layout {{ display: flex; gap: 40px; }}
progress {{ width: 100%; }}
canvas {{ border: 1px solid #ccc; background: white; }}
.swatch {{ width: 24px; height: 24px; border: 1px solid #999; cursor: pointer; }}
#images img {{ margin: 4px; cursor: pointer; }}
</style>
</head>
<body>
<div id="layout">
  <section>
    <p id="question">{question}</p>
    <progress value="{progress}" max="100"></progress>
    <form onsubmit="return sendResponse()">
      <input type="text" id="response" autocomplete="off">
      <button type="submit">Send</button>
    </form>
    <button type="button" onclick="location.href='/reflection'">View Reflection</button>
    <div id="reflectionContainer"></div>
  </section>
  <section>
    <h2>Visual Metaphor</h2>
    <div id="palette">
{palette}
    </div>
    <canvas id="drawingCanvas" width="512" height="512"></canvas>
    <form onsubmit="return generateImage(event)">
      <input type="text" id="description" placeholder="Describe your drawing">
      <button type="submit">Generate</button>
    </form>
    <p id="loading" style="display:none">Generating...</p>
    <p id="reappraisalText"></p>
    <div id="images"></div>
  </section>
</div>
<script>
const canvas = document.getElementById('drawingCanvas');
const ctx = canvas.getContext('2d');
let color = '#000000';
let drawing = false;
document.querySelectorAll('.swatch').forEach(b => b.onclick = () => {{ color = b.dataset.color; }});
canvas.onmousedown = e => {{ drawing = true; ctx.beginPath(); ctx.moveTo(e.offsetX, e.offsetY); }};
canvas.onmousemove = e => {{
  if (!drawing) return;
  ctx.strokeStyle = color; ctx.lineWidth = 8; ctx.lineCap = 'round';
  ctx.lineTo(e.offsetX, e.offsetY); ctx.stroke();
}};
canvas.onmouseup = canvas.onmouseleave = () => {{ drawing = false; }};

function sendResponse() {{
  const response = document.getElementById('response').value;
  fetch('/api/question', {{
    method: 'POST',
    headers: {{ 'Content-Type': 'application/json' }},
    body: JSON.stringify({{ response }})
  }}).then(r => r.json()).then(data => {{
    if (data.error) {{ alert(data.error); return; }}
    document.getElementById('question').textContent = data.question;
    document.querySelector('progress').value = data.progress;
    document.getElementById('response').value = '';
    if (data.restart) {{
      document.getElementById('reflectionContainer').innerText = data.responses;
    }}
  }});
  return false;
}}

function generateImage(event) {{
  event.preventDefault();
  document.getElementById('loading').style.display = 'block';
  fetch('/api/process-drawing', {{
    method: 'POST',
    headers: {{ 'Content-Type': 'application/json' }},
    body: JSON.stringify({{
      drawing: canvas.toDataURL('image/png'),
      description: document.getElementById('description').value
    }})
  }}).then(r => r.json()).then(data => {{
    document.getElementById('loading').style.display = 'none';
    if (data.error) {{ alert(data.error); return; }}
    const images = document.getElementById('images');
    data.image_urls.forEach(url => {{
      const img = new Image(256, 256);
      img.src = '/proxy?url=' + encodeURIComponent(url);
      img.onclick = () => ctx.drawImage(img, 0, 0, canvas.width, canvas.height);
      images.insertBefore(img, images.firstChild);
    }});
    document.getElementById('reappraisalText').textContent = data.reappraisal_text;
  }});
  return false;
}}
</script>
</body>
</html>
"#,
        question = escape_html(&view.question),
        progress = view.progress,
        palette = palette_buttons(),
    )
}

pub fn render_reflection(responses: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Your Reflections</title>
<style>
body {{ font-family: Helvetica, sans-serif; padding: 20px; background-color: #f0f8ff; }}
.responses {{ margin-top: 20px; line-height: 1.6; background: #fff; padding: 20px; border-radius: 5px; }}
</style>
</head>
<body>
<h1>Here is what your kids thought about today.</h1>
<div class="responses">{responses}</div>
<button onclick="window.location.href='/'">Restart Session</button>
</body>
</html>
"#,
        responses = format_reflection(responses),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"hi" & 'bye'</b>"#),
            "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn reflection_lines_are_numbered() {
        let html = format_reflection(&["sad".into(), "<angry>".into()]);
        assert_eq!(html, "Response 1: sad<br>Response 2: &lt;angry&gt;");
    }

    #[test]
    fn landing_embeds_question_progress_and_palette() {
        let html = render_landing(&SessionView {
            question: "Question 1: How do you feel?".into(),
            progress: 16.67,
            step: 2,
        });
        assert!(html.contains("Question 1: How do you feel?"));
        assert!(html.contains(r#"value="16.67""#));
        for color in BrushPalette::entries() {
            assert!(html.contains(color.hex));
        }
    }
}
