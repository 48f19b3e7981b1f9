//! End-to-end checks of parse, edit, undo and serialize.

use deck_core::{Document, EditorSession, Frontmatter, SlideBlock, SlideId};

const DEMO: &str = "---\nmarp: true\ntitle: Demo\n---\n\n# Slide 1\n\n---\n\n# Slide 2";

#[test]
fn test_demo_deck_parses() {
    let doc = Document::parse(DEMO);

    let expected: Frontmatter = [("marp", "true"), ("title", "Demo")].into_iter().collect();
    assert_eq!(doc.frontmatter, expected);

    let contents: Vec<&str> = doc.slides.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(contents, vec!["# Slide 1", "# Slide 2"]);
    assert!(doc.slides.iter().all(|s| s.comment.is_empty()));
}

#[test]
fn test_demo_deck_reserializes_canonically() {
    let text = Document::parse(DEMO).to_markdown();
    assert_eq!(
        text,
        "---\nmarp: true\ntitle: Demo\ntheme: default\npaginate: true\n---\n\n# Slide 1\n\n---\n\n# Slide 2"
    );
}

#[test]
fn test_serialized_text_round_trips() {
    let frontmatter: Frontmatter = [
        ("title", "Launch"),
        ("size", "16:9"),
        ("style", "section {\n  font-size: 28px;\n}"),
        ("footer", "ACME"),
    ]
    .into_iter()
    .collect();
    let doc = Document {
        frontmatter,
        slides: vec![
            SlideBlock::new(SlideId::positional(0), "# Launch\n\nWelcome"),
            SlideBlock::new(SlideId::positional(1), "## Plan\n\n- one\n- two")
                .with_comment("Walk through the plan.\nKeep it short."),
            SlideBlock::new(SlideId::positional(2), "```rust\nfn main() {}\n```"),
        ],
    };

    let text = doc.to_markdown();
    let reparsed = Document::parse(&text);

    assert_eq!(reparsed.to_markdown(), text);
    assert_eq!(reparsed.slides, doc.slides);
    assert_eq!(reparsed.frontmatter.get("style"), doc.frontmatter.get("style"));
}

#[test]
fn test_placeholder_is_one_directional() {
    let doc = Document {
        frontmatter: Frontmatter::new(),
        slides: vec![SlideBlock::new(SlideId::positional(0), "")],
    };
    let text = doc.to_markdown();
    assert!(text.ends_with("# New Slide"));

    let reparsed = Document::parse(&text);
    assert_eq!(reparsed.slides[0].content, "# New Slide");
}

#[test]
fn test_text_without_frontmatter() {
    let doc = Document::parse("# Only\n\n---\n\n<!-- slide-comment:\nnote\n-->\n# Two");
    assert!(doc.frontmatter.is_empty());
    assert_eq!(doc.slides.len(), 2);
    assert_eq!(doc.notes(), vec!["", "note"]);
}

#[test]
fn test_editing_session_flow() {
    let mut session = EditorSession::open("demo", DEMO);
    let second = SlideId::positional(1);

    session.set_slide_comment(&second, "Pause here").unwrap();
    session.checkpoint();
    let added = session.add_slide("# Slide 3");
    session.checkpoint();
    session.move_slide(2, 0).unwrap();
    session.checkpoint();

    let text = session.markdown();
    assert!(text.starts_with("---\nmarp: true\ntitle: Demo\n"));
    assert!(text.contains("# Slide 3\n\n---\n\n# Slide 1"));
    assert!(text.contains("<!-- slide-comment:\nPause here\n-->\n# Slide 2"));

    for _ in 0..3 {
        assert!(session.undo());
    }
    assert_eq!(session.document(), &Document::parse(DEMO));
    assert!(!session.undo());

    for _ in 0..3 {
        assert!(session.redo());
    }
    assert_eq!(session.document().slides[0].id, added);
    assert_eq!(session.markdown(), text);
}
