//! Chapter and lesson structure derived from the table of contents.
//!
//! Building runs as two sequential passes over the outline entries. The
//! first registers chapters (level 1) and lessons (level 2) in TOC order;
//! the second assigns page ranges to them and to every entry. Each pass
//! produces fresh collections, and a malformed outline never fails: it
//! falls back to a single "Main Content" chapter covering the document.

use crate::model::{Chapter, Lesson, TocEntry};

/// Owner of a page: a chapter and, optionally, one of its lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub chapter: u32,
    pub lesson: Option<u32>,
}

/// What an outline entry registers in the first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    Chapter(u32),
    Lesson { chapter: u32, lesson: u32 },
    /// Entry with no entity of its own; its pages belong to the current owner
    Detail(Option<Ownership>),
}

/// Page range claimed by one outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OwnedRange {
    start: u32,
    end: u32,
    owner: Ownership,
}

impl OwnedRange {
    fn contains(&self, page: u32) -> bool {
        page >= self.start && page <= self.end
    }
}

/// Resolved chapter/lesson layout of a document.
#[derive(Debug, Clone)]
pub struct DocumentStructure {
    chapters: Vec<Chapter>,
    lessons: Vec<Lesson>,
    ranges: Vec<OwnedRange>,
    warnings: Vec<String>,
    default_chapter: bool,
}

impl DocumentStructure {
    /// Build the structure for a document from its outline.
    pub fn build(toc: &[TocEntry], total_pages: u32) -> Self {
        let total = total_pages.max(1);
        let mut warnings = Vec::new();

        if toc.is_empty() {
            return Self::single_chapter(total, warnings);
        }

        let pages = normalize_pages(toc, total, &mut warnings);
        let registrations = register(toc);

        if !registrations
            .iter()
            .any(|r| matches!(r, Registration::Chapter(_)))
        {
            let warning = format!(
                "Outline has {} entries but no top-level chapter; using a single \"{}\" chapter",
                toc.len(),
                Chapter::DEFAULT_TITLE
            );
            log::warn!("{}", warning);
            warnings.push(warning);
            return Self::single_chapter(total, warnings);
        }

        let (chapters, lessons, ranges) = assign_ranges(toc, &pages, &registrations, total);

        Self {
            chapters,
            lessons,
            ranges,
            warnings,
            default_chapter: false,
        }
    }

    fn single_chapter(total_pages: u32, warnings: Vec<String>) -> Self {
        Self {
            chapters: vec![Chapter::default_for(total_pages)],
            lessons: Vec::new(),
            ranges: Vec::new(),
            warnings,
            default_chapter: true,
        }
    }

    /// Chapter and lesson owning a page.
    ///
    /// The first outline entry whose range contains the page wins; pages no
    /// entry claims fall back to the first chapter spanning them, then to
    /// chapter 1.
    pub fn resolve(&self, page: u32) -> Ownership {
        if let Some(range) = self.ranges.iter().find(|r| r.contains(page)) {
            return range.owner;
        }

        let chapter = self
            .chapters
            .iter()
            .find(|c| c.contains(page))
            .or_else(|| self.chapters.first())
            .map(|c| c.number)
            .unwrap_or(1);

        Ownership {
            chapter,
            lesson: None,
        }
    }

    /// Chapters in outline order.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Lessons in outline order.
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Warnings about the outline.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether the synthetic default chapter is in use.
    pub fn is_default(&self) -> bool {
        self.default_chapter
    }

    /// Consume the structure, returning chapters, lessons and warnings.
    pub fn into_parts(self) -> (Vec<Chapter>, Vec<Lesson>, Vec<String>) {
        (self.chapters, self.lessons, self.warnings)
    }
}

/// Entry pages clamped to the document; missing pages inherit the previous one.
fn normalize_pages(toc: &[TocEntry], total: u32, warnings: &mut Vec<String>) -> Vec<u32> {
    let mut pages = Vec::with_capacity(toc.len());
    let mut previous = 1;

    for entry in toc {
        let page = match entry.page {
            Some(page) if page >= 1 && page <= total => page,
            Some(page) => {
                let clamped = page.clamp(1, total);
                warnings.push(format!(
                    "Outline entry \"{}\" points to page {} outside 1..={}; using page {}",
                    entry.title, page, total, clamped
                ));
                clamped
            }
            None => {
                warnings.push(format!(
                    "Outline entry \"{}\" has no destination; using page {}",
                    entry.title, previous
                ));
                previous
            }
        };
        pages.push(page);
        previous = page;
    }

    if pages.windows(2).any(|w| w[1] < w[0]) {
        warnings.push("Outline pages are not in ascending order".to_string());
    }
    pages
}

/// First pass: register chapters and lessons in TOC order.
fn register(toc: &[TocEntry]) -> Vec<Registration> {
    let mut chapter_count = 0;
    let mut current: Option<Ownership> = None;

    toc.iter()
        .map(|entry| match entry.level {
            0 | 1 => {
                chapter_count += 1;
                current = Some(Ownership {
                    chapter: chapter_count,
                    lesson: None,
                });
                Registration::Chapter(chapter_count)
            }
            2 => match current {
                Some(owner) => {
                    let lesson = owner.lesson.map(|n| n + 1).unwrap_or(1);
                    current = Some(Ownership {
                        chapter: owner.chapter,
                        lesson: Some(lesson),
                    });
                    Registration::Lesson {
                        chapter: owner.chapter,
                        lesson,
                    }
                }
                None => Registration::Detail(None),
            },
            _ => Registration::Detail(current),
        })
        .collect()
}

/// Second pass: page ranges for every registered entity and entry.
fn assign_ranges(
    toc: &[TocEntry],
    pages: &[u32],
    registrations: &[Registration],
    total: u32,
) -> (Vec<Chapter>, Vec<Lesson>, Vec<OwnedRange>) {
    // End of the span starting at entry `i`, up to the next entry accepted by `stops`
    let span_end = |i: usize, stops: &dyn Fn(&Registration) -> bool| -> u32 {
        let end = registrations[i + 1..]
            .iter()
            .position(stops)
            .map(|offset| pages[i + 1 + offset].saturating_sub(1))
            .unwrap_or(total);
        end.max(pages[i])
    };

    let mut chapters: Vec<Chapter> = Vec::new();
    let mut lessons: Vec<Lesson> = Vec::new();
    let mut ranges = Vec::new();

    for (i, registration) in registrations.iter().enumerate() {
        let entry_range = (pages[i], span_end(i, &|_| true));

        match *registration {
            Registration::Chapter(number) => {
                let start = if chapters.is_empty() { 1 } else { pages[i] };
                let end = span_end(i, &|r| matches!(r, Registration::Chapter(_)));
                chapters.push(Chapter::new(
                    number,
                    title_or(&toc[i].title, "Chapter", number),
                    start,
                    end.max(start),
                ));
                ranges.push(OwnedRange {
                    start: entry_range.0,
                    end: entry_range.1,
                    owner: Ownership {
                        chapter: number,
                        lesson: None,
                    },
                });
            }
            Registration::Lesson { chapter, lesson } => {
                let end = span_end(i, &|r| {
                    matches!(r, Registration::Chapter(_) | Registration::Lesson { .. })
                });
                lessons.push(Lesson {
                    number: lesson,
                    chapter_number: chapter,
                    title: title_or(&toc[i].title, "Lesson", lesson),
                    start_page: pages[i],
                    end_page: end,
                });
                ranges.push(OwnedRange {
                    start: pages[i],
                    end,
                    owner: Ownership {
                        chapter,
                        lesson: Some(lesson),
                    },
                });
            }
            Registration::Detail(Some(owner)) => ranges.push(OwnedRange {
                start: entry_range.0,
                end: entry_range.1,
                owner,
            }),
            Registration::Detail(None) => {}
        }
    }

    (chapters, lessons, ranges)
}

fn title_or(title: &str, kind: &str, number: u32) -> String {
    let title = title.trim();
    if title.is_empty() {
        format!("{} {}", kind, number)
    } else {
        title.to_string()
    }
}
