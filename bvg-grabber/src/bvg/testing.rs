//! Canned board pages and a one-shot HTTP server for tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub(crate) const SCHEDULED_PAGE: &str = r#"
<html><body>
<div id="ivu_overview_input">S+U Alexanderplatz Bhf (Berlin)</div>
<table class="ivu_table">
  <thead><tr><th>Ab</th><th>Linie</th><th>Ziel</th></tr></thead>
  <tbody>
<tr><td class="ivu_table_c_dep">16:07</td><td class="ivu_table_c_line"><a href="/x">S5</a></td><td>S Westkreuz</td></tr>
<tr><td class="ivu_table_c_dep">16:09</td><td class="ivu_table_c_line">S7</td><td>S Potsdam Hauptbahnhof</td></tr>
<tr><td class="ivu_table_c_dep">16:12</td><td class="ivu_table_c_line">S75</td><td>S Westkreuz</td></tr>
  </tbody>
</table>
</body></html>"#;

pub(crate) const SCHEDULED_AMBIGUOUS: &str = r#"
<html><body>
<span class="error">Ihre Eingabe ist nicht eindeutig.</span>
<span class="select">
  <a href="?input=1">Berlin Hauptbahnhof</a><br/>
  <a href="?input=2">Berlin Zoologischer Garten</a><br/>
  <a href="?input=3">Berlin Ostbahnhof</a>
</span>
</body></html>"#;

pub(crate) const SCHEDULED_NOT_FOUND: &str = r#"
<html><body>
<span class="error">Ihre Eingabe ist nicht bekannt.</span>
<span class="select"></span>
</body></html>"#;

pub(crate) const ACTUAL_PAGE: &str = r#"
<html><body>
<form action="/IstAbfahrtzeiten/index/mobil" method="get"><input name="input"/></form>
<table class="ivu_table">
  <thead><tr><th>Zeit</th><th>Linie</th><th>Ziel</th></tr></thead>
  <tbody>
<tr class="odd"><td>16:05 *</td><td>
    Bus
    M48
</td><td>S+U Alexanderplatz</td></tr>
<tr class="even"><td>16:11</td><td>Bus 200</td><td>Michelangelostr.</td></tr>
  </tbody>
</table>
</body></html>"#;

pub(crate) const ACTUAL_AMBIGUOUS: &str = r#"
<html><body>
<form action="/IstAbfahrtzeiten/index/mobil" method="get">
  <select name="input">
<option value="1">Berlin Hauptbahnhof</option>
<option value="2">Berlin Zoologischer Garten</option>
  </select>
</form>
</body></html>"#;

pub(crate) const ACTUAL_NOT_FOUND: &str = r#"
<html><body>
<p>Keine Haltestelle gefunden.</p>
<form action="/IstAbfahrtzeiten/index/mobil" method="get"><input name="input"/></form>
</body></html>"#;

/// Answer a single request on a local port with `status` and `body`.
///
/// Returns the board URL to query and a handle that resolves to the
/// request head the server received.
pub(crate) async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}/dox"), handle)
}
