// Host page for the widget: fetches frames and forwards pointer, resize and pause events
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>realtime-graph</title>
<style>
  body { margin: 0; font-family: Inter, sans-serif; background: #f3f3f3; }
  .rg-main { display: flex; flex-direction: column; height: 100vh; padding: 16px; box-sizing: border-box; }
  .rg-control-buttons { display: flex; gap: 8px; margin-bottom: 8px; }
  .rg-control-button { border: 1px solid #6c6c6c; background: #fff; border-radius: 4px; padding: 4px 10px; cursor: pointer; }
  .rg-svg-container { flex: 1; min-height: 0; }
  .rg-svg-container svg { width: 100%; height: 100%; display: block; }
</style>
</head>
<body>
<div class="rg-main">
  <div class="rg-control-buttons">
    <button class="rg-control-button" id="rg-pause">Pause / Resume</button>
  </div>
  <div class="rg-svg-container" id="rg-canvas"></div>
</div>
<script>
  const canvas = document.getElementById("rg-canvas");
  const post = (path, body) => fetch(path, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: body === undefined ? undefined : JSON.stringify(body),
  });

  new ResizeObserver((entries) => {
    const rect = entries[0].contentRect;
    post("/graph/resize", { width: Math.floor(rect.width), height: Math.floor(rect.height) });
  }).observe(canvas);

  canvas.addEventListener("mousemove", (e) => {
    const rect = canvas.getBoundingClientRect();
    post("/graph/pointer", { x: e.clientX - rect.left, y: e.clientY - rect.top });
  });
  canvas.addEventListener("mouseleave", () => fetch("/graph/pointer", { method: "DELETE" }));
  document.getElementById("rg-pause").addEventListener("click", () => post("/graph/pause"));

  async function tick() {
    try {
      const response = await fetch("/graph.svg", { cache: "no-store" });
      if (response.ok) {
        canvas.innerHTML = await response.text();
      }
    } finally {
      requestAnimationFrame(tick);
    }
  }
  tick();
</script>
</body>
</html>
"#;
