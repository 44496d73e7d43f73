//! Integration tests for reading real PDF documents.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tempfile::NamedTempFile;

use textbook_extract::{
    extract_bytes, extract_file, Error, PageSource, PdfSource, QuestionType, SectionType, Stage,
};

/// One line of text: font resource, size, x, y (PDF space), text.
type Line = (&'static str, i64, i64, i64, &'static str);

fn page_one() -> Vec<Line> {
    vec![
        ("F1", 12, 72, 600, "Plants make their own food from light."),
        ("F1", 12, 72, 586, "They take in water through their roots."),
    ]
}

fn page_two() -> Vec<Line> {
    vec![
        ("F2", 12, 72, 600, "Exercise 1"),
        ("F1", 12, 72, 586, "1. What do roots do?"),
        ("F1", 12, 72, 572, "2. Why are leaves green?"),
        ("F1", 12, 72, 300, "Leaves turn sunlight into sugar."),
    ]
}

fn page_three() -> Vec<Line> {
    vec![("F1", 12, 72, 400, "Teacher's Note: read the poem aloud.")]
}

fn content(lines: &[Line]) -> Vec<u8> {
    let mut operations = Vec::new();
    for (font, size, x, y, text) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![(*font).into(), (*size).into()]));
        operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }.encode().unwrap()
}

/// Build a PDF. `None` pages have no content stream at all.
fn build_pdf(pages: &[Option<Vec<Line>>], outline: &[(&str, usize)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut page_ids: Vec<ObjectId> = Vec::new();
    for lines in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources,
        };
        if let Some(lines) = lines {
            let stream = doc.add_object(Stream::new(dictionary! {}, content(lines)));
            page.set("Contents", stream);
        }
        page_ids.push(doc.add_object(page));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };

    if !outline.is_empty() {
        let outlines_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = outline.iter().map(|_| doc.new_object_id()).collect();

        for (i, (title, page_index)) in outline.iter().enumerate() {
            let mut item = dictionary! {
                "Title" => Object::string_literal(*title),
                "Parent" => outlines_id,
                "Dest" => vec![Object::Reference(page_ids[*page_index]), "Fit".into()],
            };
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if i + 1 < item_ids.len() {
                item.set("Next", item_ids[i + 1]);
            }
            doc.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => item_ids[0],
                "Last" => item_ids[item_ids.len() - 1],
                "Count" => item_ids.len() as i64,
            }),
        );
        catalog.set("Outlines", outlines_id);
    }

    let catalog_id = doc.add_object(catalog);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Nature Reader"),
        "Author" => Object::string_literal("Grade 3 Team"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

fn reader_pdf() -> Vec<u8> {
    build_pdf(
        &[Some(page_one()), Some(page_two()), Some(page_three())],
        &[("Plants", 0), ("Exercises", 1)],
    )
}

/// Rewrite every outline destination as a named one, registered either in a
/// `/Names` tree or in the catalog `/Dests` dictionary.
fn with_named_destinations(data: &[u8], name_tree: bool) -> Vec<u8> {
    let mut doc = Document::load_mem(data).unwrap();
    let items: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, obj)| {
            obj.as_dict()
                .map(|d| d.has(b"Title") && d.has(b"Dest"))
                .unwrap_or(false)
        })
        .map(|(id, _)| *id)
        .collect();

    let mut named: Vec<(String, Object)> = Vec::new();
    for (i, id) in items.into_iter().enumerate() {
        let item = doc.get_object_mut(id).unwrap().as_dict_mut().unwrap();
        let dest = item.get(b"Dest").unwrap().clone();
        let name = format!("chap.{}", i + 1);
        item.set("Dest", Object::string_literal(name.clone()));
        named.push((name, dest));
    }

    if name_tree {
        let mut pairs = Vec::new();
        for (name, dest) in named {
            pairs.push(Object::string_literal(name));
            pairs.push(Object::Dictionary(dictionary! { "D" => dest }));
        }
        let leaf = doc.add_object(dictionary! { "Names" => pairs });
        let catalog = doc.catalog_mut().unwrap();
        catalog.set(
            "Names",
            dictionary! {
                "Dests" => dictionary! { "Kids" => vec![Object::Reference(leaf)] },
            },
        );
    } else {
        let mut dests = lopdf::Dictionary::new();
        for (name, dest) in named {
            dests.set(name, dest);
        }
        doc.catalog_mut().unwrap().set("Dests", dests);
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_open_reads_page_tree() {
    let file = write_temp(&reader_pdf());
    let source = PdfSource::open(file.path()).unwrap();

    assert_eq!(source.page_count(), 3);
    assert_eq!(source.name(), file.path().display().to_string());
}

#[test]
fn test_page_blocks() {
    let source = PdfSource::from_bytes(&reader_pdf()).unwrap();
    let page = source.page(2).unwrap();

    assert_eq!(page.number, 2);
    assert_eq!((page.width, page.height), (612.0, 792.0));
    assert_eq!(page.blocks.len(), 2);

    let exercise = &page.blocks[0];
    assert_eq!(
        exercise.text(),
        "Exercise 1\n1. What do roots do?\n2. Why are leaves green?"
    );
    assert!(exercise.spans().next().unwrap().is_bold);
    // Top-down coordinates: the exercise sits above the paragraph
    assert!(exercise.bbox.y0 < page.blocks[1].bbox.y0);
    assert_eq!(page.blocks[1].text(), "Leaves turn sunlight into sugar.");
}

#[test]
fn test_outline_entries() {
    let source = PdfSource::from_bytes(&reader_pdf()).unwrap();
    let toc = source.outline().unwrap();

    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].title, "Plants");
    assert_eq!(toc[0].level, 1);
    assert_eq!(toc[0].page, Some(1));
    assert_eq!(toc[1].title, "Exercises");
    assert_eq!(toc[1].page, Some(2));
}

#[test]
fn test_outline_named_destinations() {
    for name_tree in [false, true] {
        let data = with_named_destinations(&reader_pdf(), name_tree);
        let source = PdfSource::from_bytes(&data).unwrap();
        let toc = source.outline().unwrap();

        let pages: Vec<_> = toc.iter().map(|e| (e.title.as_str(), e.page)).collect();
        assert_eq!(pages, vec![("Plants", Some(1)), ("Exercises", Some(2))]);

        let result = extract_bytes(&data).unwrap();
        let chapters: Vec<_> = result
            .chapters
            .iter()
            .map(|c| (c.title.as_str(), c.start_page, c.end_page))
            .collect();
        assert_eq!(chapters, vec![("Plants", 1, 1), ("Exercises", 2, 3)]);
    }
}

#[test]
fn test_missing_outline_is_empty() {
    let data = build_pdf(&[Some(page_one())], &[]);
    let source = PdfSource::from_bytes(&data).unwrap();
    assert!(source.outline().unwrap().is_empty());
}

#[test]
fn test_document_metadata() {
    let source = PdfSource::from_bytes(&reader_pdf()).unwrap();
    assert_eq!(source.title().as_deref(), Some("Nature Reader"));
    assert_eq!(source.author().as_deref(), Some("Grade 3 Team"));
    assert_eq!(source.version().as_deref(), Some("1.5"));
}

#[test]
fn test_page_out_of_range() {
    let source = PdfSource::from_bytes(&reader_pdf()).unwrap();
    assert!(matches!(source.page(9), Err(Error::PageOutOfRange(9, 3))));
    assert!(matches!(source.page(0), Err(Error::PageOutOfRange(0, 3))));
}

#[test]
fn test_page_without_contents() {
    let data = build_pdf(&[Some(page_one()), None], &[]);
    let source = PdfSource::from_bytes(&data).unwrap();
    assert!(!source.page(2).unwrap().has_text());

    let result = extract_bytes(&data).unwrap();
    assert_eq!(result.sections.len(), 1);
    assert_eq!(result.errors, vec!["Page 2 has no extractable text".to_string()]);
}

#[test]
fn test_extract_file_end_to_end() {
    let file = write_temp(&reader_pdf());
    let result = extract_file(file.path()).unwrap();

    assert_eq!(result.total_pages, 3);
    assert_eq!(result.metadata.title.as_deref(), Some("Nature Reader"));
    assert_eq!(result.metadata.pdf_version.as_deref(), Some("1.5"));
    assert_eq!(result.metadata.outline_entries, 2);

    let chapters: Vec<_> = result
        .chapters
        .iter()
        .map(|c| (c.title.as_str(), c.start_page, c.end_page))
        .collect();
    assert_eq!(chapters, vec![("Plants", 1, 1), ("Exercises", 2, 3)]);

    let types: Vec<_> = result
        .sections
        .iter()
        .map(|s| (s.page_number, s.section_type))
        .collect();
    assert_eq!(
        types,
        vec![
            (1, SectionType::ReadingMaterial),
            (2, SectionType::Exercise),
            (2, SectionType::ReadingMaterial),
            (3, SectionType::TeacherNote),
        ]
    );
    assert_eq!(result.sections[3].chapter, Some(2));

    assert_eq!(result.questions.len(), 2);
    assert!(result
        .questions
        .iter()
        .all(|q| q.question_type == QuestionType::ShortAnswer && q.section == Some(1)));
    assert_eq!(result.questions[1].text, "2. Why are leaves green?");
}

#[test]
fn test_rejects_non_pdf_bytes() {
    let err = extract_bytes(b"PK\x03\x04 not a pdf").unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Open));
    assert!(matches!(
        err,
        Error::ExtractionFailure { cause, .. } if matches!(*cause, Error::UnknownFormat)
    ));
}
