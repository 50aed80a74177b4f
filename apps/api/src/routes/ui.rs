use axum::response::Html;

/// GET /
/// Single-page upload form. Posts the chosen file to the analyze endpoint and
/// shows the three result fields.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Resume Classifier + AI Feedback Generator</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
    label { display: block; font-weight: 600; margin-top: 1rem; }
    textarea, input[type=text] { width: 100%; box-sizing: border-box; }
    button { margin-top: 1rem; padding: .5rem 1rem; }
  </style>
</head>
<body>
  <h1>📄 Resume Classifier + AI Feedback Generator</h1>
  <form id="upload">
    <label for="file">Upload your resume (PDF only)</label>
    <input id="file" name="file" type="file" accept=".pdf,application/pdf">
    <button type="submit">🔎 Analyze Resume</button>
  </form>
  <label for="preview">📜 Extracted Resume Preview</label>
  <textarea id="preview" rows="10" readonly></textarea>
  <label for="role">🎯 Predicted Role</label>
  <input id="role" type="text" readonly>
  <label for="feedback">📝 AI Feedback</label>
  <textarea id="feedback" rows="5" readonly></textarea>
  <script>
    const form = document.getElementById("upload");
    const show = (preview, role, feedback) => {
      document.getElementById("preview").value = preview;
      document.getElementById("role").value = role;
      document.getElementById("feedback").value = feedback;
    };
    form.addEventListener("submit", async (event) => {
      event.preventDefault();
      show("Analyzing...", "", "");
      const response = await fetch("/api/v1/analyze", { method: "POST", body: new FormData(form) });
      const body = await response.json();
      if (!response.ok) {
        show(body.error ? body.error.message : response.statusText, "", "");
        return;
      }
      show(body.text_preview, body.predicted_role, body.feedback);
    });
  </script>
</body>
</html>
"#;
