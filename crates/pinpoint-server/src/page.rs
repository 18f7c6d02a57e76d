//! The visitor-facing tracking page served at `/track/{token}`.
//!
//! The page asks the browser for a single high-accuracy position and posts it
//! to `/report/{token}`. Browsers only expose geolocation on secure or
//! localhost origins.

use axum::{
  extract::Path,
  response::Html,
};
use pinpoint_core::token::Token;

use crate::error::Error;

const TOKEN_PLACEHOLDER: &str = "__PINPOINT_TOKEN__";

const TEMPLATE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8"/>
    <title>Share Location</title>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body style="font-family:sans-serif; text-align:center; margin-top:50px;">
    <h2>Share your location</h2>
    <p id="status">Requesting permission…</p>
    <script>
      const token = "__PINPOINT_TOKEN__";
      const statusEl = document.getElementById("status");
      function show(msg) { statusEl.innerText = msg; }

      function sendReport(data) {
        fetch("/report/" + token, {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify(data)
        }).then(r => {
          if (r.ok) show("Location sent! You may close this tab.");
          else show("Failed to send location.");
        }).catch(err => show("Network error: " + err));
      }

      if (!navigator.geolocation) {
        show("Geolocation is not supported by your browser.");
      } else {
        navigator.geolocation.getCurrentPosition(function (pos) {
          sendReport({
            token: token,
            timestamp: new Date().toISOString(),
            latitude: pos.coords.latitude,
            longitude: pos.coords.longitude,
            accuracy: pos.coords.accuracy,
            heading: pos.coords.heading,
            speed: pos.coords.speed,
            userAgent: navigator.userAgent
          });
          show("Got location, sending…");
        }, function (err) {
          show("Permission denied or error: " + err.message);
        }, {
          enableHighAccuracy: true,
          timeout: 10000,
          maximumAge: 0
        });
      }
    </script>
  </body>
</html>
"#;

/// Render the tracking page for an already-validated token.
pub fn render(token: &Token) -> String {
  TEMPLATE.replace(TOKEN_PLACEHOLDER, token.as_str())
}

/// `GET /track/:token`
///
/// Served for any well-formed token, issued or not; the report it produces
/// creates the token if needed.
pub async fn handler(Path(token): Path<String>) -> Result<Html<String>, Error> {
  let token = Token::parse(&token).map_err(|_| Error::NotFound)?;
  Ok(Html(render(&token)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_is_embedded_once_in_script() {
    let page = render(&Token::parse("abc123").unwrap());
    assert!(page.contains(r#"const token = "abc123";"#));
    assert!(!page.contains(TOKEN_PLACEHOLDER));
    assert!(page.contains("navigator.geolocation.getCurrentPosition"));
  }
}
