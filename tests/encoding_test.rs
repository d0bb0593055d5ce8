use hidewall::encoding::decode_body;
use hidewall::{BlockedSiteSet, Bypass, Options};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Windows-1252 bytes with no in-document declaration: only the header names the charset
const LEGACY_PAGE: &[u8] = b"<html><body><p>\x93Caf\xE9\x94 in M\xFCnchen</p></body></html>";

#[test]
fn header_charset_decodes_legacy_bytes() {
    let text = decode_body(LEGACY_PAGE, Some("text/html; charset=windows-1252"));
    assert!(text.contains("\u{201C}Café\u{201D} in München"));
}

#[test]
fn missing_charset_defaults_to_utf8_lossy() {
    let text = decode_body(LEGACY_PAGE, Some("text/html"));
    assert!(text.contains('\u{FFFD}'));
    assert!(text.contains("in M"));
}

#[test]
fn utf8_content_handled_correctly() {
    let html = "<p>é, ñ, ü, 中文</p>".as_bytes();
    assert_eq!(decode_body(html, None), "<p>é, ñ, ü, 中文</p>");
}

#[tokio::test]
async fn pipeline_uses_response_charset() {
    let filler = "<p>Plain ASCII filler so the mirror copy reads as an article.</p>".repeat(20);
    let page = [
        b"<html><body>".as_slice(),
        filler.as_bytes(),
        b"<p>\x93Caf\xE9\x94 in M\xFCnchen</p></body></html>".as_slice(),
    ]
    .concat();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(page, "text/html; charset=windows-1252"),
        )
        .mount(&server)
        .await;

    let options = Options {
        mirror_base: format!("{}/latest/", server.uri()),
        ..Options::default()
    };
    let bypass = Bypass::new(options, BlockedSiteSet::new(["example-news.com"]))
        .expect("engine builds");
    let response = bypass
        .handle(Some("https://www.example-news.com/story"), None)
        .await;

    assert_eq!(response.status, 200);
    assert!(response.body.contains("\u{201C}Café\u{201D} in München"));
}
