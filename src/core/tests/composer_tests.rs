// src/core/tests/composer_tests.rs

use super::super::composer::{AssemblyError, PayloadAssembler, PostLimits, ELLIPSIS};

fn ascii_limits(max_chars: usize) -> PostLimits {
    PostLimits {
        max_chars,
        link_cost: 23,
        weighted_cjk: false,
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_weighted_length() {
    let limits = PostLimits::default();
    assert_eq!(limits.weighted_len("abc"), 3);
    assert_eq!(limits.weighted_len("日本"), 4);
    assert_eq!(limits.weighted_len("見て https://example.com/a/very/long/path"), 28);
    assert_eq!(limits.weighted_len("a https://x.y/1 b https://x.y/2"), 5 + 46);

    let flat = ascii_limits(280);
    assert_eq!(flat.weighted_len("日本"), 2);
}

#[test]
fn test_short_post_untouched() {
    let assembler = PayloadAssembler::new(PostLimits::default());
    let payload = assembler.assemble("  short  ", &tags(&["#a"]), None).unwrap();
    assert_eq!(payload.text, "short\n#a");
    assert_eq!(payload.weighted_len, 8);
    assert!(!payload.truncated);
    assert!(payload.dropped_hashtags.is_empty());
}

#[test]
fn test_long_body_truncated_link_intact() {
    let assembler = PayloadAssembler::new(PostLimits {
        max_chars: 140,
        link_cost: 23,
        weighted_cjk: true,
    });
    let body = "abcd ".repeat(40);
    let link = "https://example.com/news/2024/10/17/a-rather-long-article-path";
    let payload = assembler
        .assemble(&body, &tags(&["#a", "#b", "#c"]), Some(link))
        .unwrap();

    assert!(payload.weighted_len <= 140, "got {}", payload.weighted_len);
    assert!(payload.truncated);
    assert!(payload.dropped_hashtags.is_empty());
    assert!(payload.text.ends_with(&format!("\n#a #b #c\n{link}")));
    let body_part = payload.text.split('\n').next().unwrap();
    assert!(body_part.ends_with(ELLIPSIS));
    assert!(body_part.ends_with(&format!("abcd{ELLIPSIS}")), "cut on a word boundary");
}

#[test]
fn test_drops_trailing_hashtags_then_shortens() {
    let assembler = PayloadAssembler::new(ascii_limits(40));
    let payload = assembler
        .assemble("hello world", &tags(&["#one", "#two", "#three"]), Some("https://x.y/z"))
        .unwrap();

    assert_eq!(payload.text, format!("hello{ELLIPSIS}\n#one #two\nhttps://x.y/z"));
    assert_eq!(payload.weighted_len, 40);
    assert!(payload.truncated);
    assert_eq!(payload.dropped_hashtags, vec!["#three"]);
}

#[test]
fn test_shortening_preferred_over_dropping() {
    let assembler = PayloadAssembler::new(ascii_limits(60));
    let body = "x".repeat(100);
    let payload = assembler.assemble(&body, &tags(&["#a", "#b"]), None).unwrap();

    assert_eq!(payload.text, format!("{}{ELLIPSIS}\n#a #b", "x".repeat(53)));
    assert_eq!(payload.weighted_len, 60);
    assert!(payload.dropped_hashtags.is_empty());
}

#[test]
fn test_cjk_body_fits_weighted_budget() {
    let assembler = PayloadAssembler::new(PostLimits::default());
    let body = "あ".repeat(200);
    let link = "https://www3.nhk.or.jp/news/html/20241017/k1.html";
    let payload = assembler.assemble(&body, &[], Some(link)).unwrap();

    assert!(payload.weighted_len <= 280, "got {}", payload.weighted_len);
    assert!(payload.weighted_len >= 270, "should use most of the budget");
    assert!(payload.truncated);
    assert!(payload.text.ends_with(&format!("{ELLIPSIS}\n{link}")));
}

#[test]
fn test_assembly_errors() {
    let assembler = PayloadAssembler::new(PostLimits::default());
    assert_eq!(assembler.assemble("   ", &[], None), Err(AssemblyError::EmptyBody));

    let tight = PayloadAssembler::new(ascii_limits(20));
    assert_eq!(
        tight.assemble("body", &[], Some("https://example.com")),
        Err(AssemblyError::LinkTooLong { cost: 23, max: 20 })
    );

    let no_room = PayloadAssembler::new(ascii_limits(25));
    assert_eq!(
        no_room.assemble("hello", &tags(&["#a"]), Some("https://example.com")),
        Err(AssemblyError::NoRoomForBody { max: 25 })
    );
}
