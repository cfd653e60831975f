use axum::response::Html;

/// `GET /`: a short, human-readable description of the two endpoints.
pub async fn index() -> Html<&'static str> {
    Html(
        r#"<html>
  <head><title>Receipt Scraper API</title></head>
  <body>
    <h1>Receipt Scraper API</h1>
    <p>Extracts data from CBE and Telebirr payment receipts.</p>
    <h3>GET /api/cbe</h3>
    <p>Query parameter: <code>id</code>, the receipt ID.</p>
    <p>Example: <code>/api/cbe?id=FT25186CS2K308680658</code></p>
    <h3>GET /api/telebirr</h3>
    <p>Query parameter: <code>transaction_number</code>, the receipt transaction number.</p>
    <p>Example: <code>/api/telebirr?transaction_number=CG179W93AJ</code></p>
  </body>
</html>"#,
    )
}
