//! Positioned text extraction from PDF content streams.
//!
//! Content-stream text operators are replayed to recover spans with
//! position and font, spans are grouped into lines by baseline, and lines
//! are grouped into blocks by spacing. Output coordinates are converted to
//! a top-left origin.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, PositionedBlock, TextLine, TextSpan};

/// Horizontal gap (in multiples of font size) that splits a baseline into
/// separate lines, e.g. body text and a margin note.
const COLUMN_GAP_FACTOR: f32 = 3.0;

/// Page rectangle as given by the MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl PageFrame {
    /// Frame from MediaBox corners.
    pub fn from_media_box(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self {
            left: llx.min(urx),
            bottom: lly.min(ury),
            width: (urx - llx).abs(),
            height: (ury - lly).abs(),
        }
    }

    /// US Letter, the fallback when no MediaBox is present.
    pub fn letter() -> Self {
        Self::from_media_box(0.0, 0.0, 612.0, 792.0)
    }

    fn top(&self) -> f32 {
        self.bottom + self.height
    }
}

/// A span together with its text-space placement (PDF coordinates).
#[derive(Debug, Clone)]
pub(crate) struct PlacedSpan {
    pub span: TextSpan,
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
}

impl PlacedSpan {
    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Replay the text operators of a content stream.
///
/// Positions are in page space: the text matrix is combined with the
/// current transformation matrix, which `q`, `Q` and `cm` maintain.
pub(crate) fn extract_spans(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
) -> Result<Vec<PlacedSpan>> {
    let content =
        lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut state = TextState::default();
    let mut saved: Vec<TextState> = Vec::new();
    let mut metrics_cache: BTreeMap<Vec<u8>, Option<FontMetrics>> = BTreeMap::new();
    let mut in_text = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => saved.push(state.clone()),
            "Q" => {
                if let Some(previous) = saved.pop() {
                    state = previous;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let v: Vec<f32> = op.operands.iter().map(|o| number(o).unwrap_or(0.0)).collect();
                    state.ctm = Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]).concat(&state.ctm);
                }
            }
            "BT" => {
                in_text = true;
                state.matrix = TextMatrix::default();
            }
            "ET" => in_text = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(name) = &op.operands[0] {
                        let font = fonts.get(name.as_slice()).copied();
                        state.font_key = Some(name.clone());
                        state.font_name = font
                            .and_then(|f| f.get(b"BaseFont").ok())
                            .and_then(|o| o.as_name().ok())
                            .map(|n| String::from_utf8_lossy(n).to_string())
                            .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                        state.metrics = metrics_cache
                            .entry(name.clone())
                            .or_insert_with(|| font.and_then(|f| FontMetrics::from_font(doc, f)))
                            .clone();
                    }
                    state.font_size = number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = number(&op.operands[0]).unwrap_or(0.0);
                    let ty = number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.matrix.translate_line(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let v: Vec<f32> = op.operands.iter().map(|o| number(o).unwrap_or(0.0)).collect();
                    state.matrix.set(v[0], v[1], v[2], v[3], v[4], v[5]);
                }
            }
            "T*" => {
                if in_text {
                    state.next_line();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if !in_text {
                    continue;
                }
                if op.operator == "'" || op.operator == "\"" {
                    state.next_line();
                }

                let font = state
                    .font_key
                    .as_ref()
                    .and_then(|key| fonts.get(key.as_slice()).copied());
                let encoding = font.and_then(|f| f.get_font_encoding(doc).ok());
                let metrics = state.metrics.as_ref();
                let measure = |bytes: &[u8]| -> (String, f32) {
                    let text = encoding
                        .as_ref()
                        .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
                        .unwrap_or_else(|| decode_text_simple(bytes));
                    let units = glyph_units(bytes, &text, metrics);
                    (text, units)
                };
                let (text, units) = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => decode_array(items, &measure),
                        _ => (String::new(), 0.0),
                    },
                    "\"" => string_operand(op.operands.get(2), &measure),
                    _ => string_operand(op.operands.first(), &measure),
                };

                // Text-space advance
                let advance = units / 1000.0 * state.font_size;
                if !text.trim().is_empty() {
                    let placement = state.matrix.to_matrix().concat(&state.ctm);
                    let (x, y) = placement.apply(0.0, 0.0);
                    spans.push(PlacedSpan {
                        span: TextSpan::new(
                            text,
                            state.font_size * placement.vertical_scale(),
                            state.font_name.clone(),
                        ),
                        x,
                        y,
                        width: advance * placement.horizontal_scale(),
                    });
                }
                state.matrix.advance(advance);
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Glyph widths of a simple font, in 1/1000 text-space units.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    missing_width: f32,
}

impl FontMetrics {
    /// Read `FirstChar` and `Widths`. Composite fonts and fonts without
    /// widths yield `None`.
    pub(crate) fn from_font(doc: &LopdfDocument, font: &lopdf::Dictionary) -> Option<Self> {
        let resolve = |obj: &Object| -> Option<Object> {
            match obj {
                Object::Reference(r) => doc.get_object(*r).ok().cloned(),
                other => Some(other.clone()),
            }
        };

        if font.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice()) {
            return None;
        }
        let widths: Vec<f32> = resolve(font.get(b"Widths").ok()?)?
            .as_array()
            .ok()?
            .iter()
            .map(|o| resolve(o).as_ref().and_then(number).unwrap_or(0.0))
            .collect();
        if widths.is_empty() {
            return None;
        }
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(resolve)
            .as_ref()
            .and_then(number)
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(0);
        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(resolve)
            .and_then(|d| d.as_dict().ok().and_then(|d| d.get(b"MissingWidth").ok().cloned()))
            .as_ref()
            .and_then(number)
            .unwrap_or(DEFAULT_GLYPH_WIDTH);

        Some(Self {
            first_char,
            widths,
            missing_width,
        })
    }

    fn width(&self, code: u8) -> f32 {
        (code as u32)
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }
}

/// Width assumed per character when a font has no usable metrics.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Advance of a shown string in 1/1000 text-space units.
fn glyph_units(bytes: &[u8], text: &str, metrics: Option<&FontMetrics>) -> f32 {
    match metrics {
        Some(m) => bytes.iter().map(|&b| m.width(b)).sum(),
        None => text.chars().count() as f32 * DEFAULT_GLYPH_WIDTH,
    }
}

type Measure<'a> = dyn Fn(&[u8]) -> (String, f32) + 'a;

fn string_operand(obj: Option<&Object>, measure: &Measure) -> (String, f32) {
    match obj {
        Some(Object::String(bytes, _)) => measure(bytes),
        _ => (String::new(), 0.0),
    }
}

/// Decode a `TJ` array, turning large negative kerning into word spaces.
/// Returns the text and its advance in 1/1000 text-space units.
fn decode_array(items: &[Object], measure: &Measure) -> (String, f32) {
    // 1/1000 text-space units; ~200 is a typical inter-word adjustment
    const SPACE_ADJUSTMENT: f32 = 200.0;

    let mut text = String::new();
    let mut units = 0.0;
    for item in items {
        match item {
            Object::String(bytes, _) => {
                let (part, width) = measure(bytes);
                text.push_str(&part);
                units += width;
            }
            Object::Integer(_) | Object::Real(_) => {
                let adjustment = -number(item).unwrap_or(0.0);
                units += adjustment;
                if adjustment > SPACE_ADJUSTMENT
                    && !text.is_empty()
                    && !text.ends_with(char::is_whitespace)
                {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    (text, units)
}

/// Fallback decoding: UTF-16BE with BOM, then UTF-8, then Latin-1.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Spans sharing a baseline and not separated by a wide gap.
#[derive(Debug, Clone)]
struct LineRun {
    spans: Vec<PlacedSpan>,
    baseline: f32,
    font_size: f32,
}

impl LineRun {
    fn new(spans: Vec<PlacedSpan>) -> Self {
        let baseline = spans.first().map(|s| s.y).unwrap_or(0.0);
        let font_size = spans
            .iter()
            .map(|s| s.span.font_size)
            .fold(0.0_f32, f32::max);
        Self {
            spans,
            baseline,
            font_size,
        }
    }

    fn left(&self) -> f32 {
        self.spans.first().map(|s| s.x).unwrap_or(0.0)
    }

    fn right(&self) -> f32 {
        self.spans.iter().map(PlacedSpan::right).fold(f32::MIN, f32::max)
    }

    fn overlaps(&self, left: f32, right: f32) -> bool {
        self.left() <= right && left <= self.right()
    }

    /// Bounding box with a top-left origin.
    fn bbox(&self, frame: &PageFrame) -> BoundingBox {
        let ascent = self.baseline + self.font_size * 0.8;
        let descent = self.baseline - self.font_size * 0.2;
        BoundingBox::new(
            self.left() - frame.left,
            frame.top() - ascent,
            self.right() - frame.left,
            frame.top() - descent,
        )
    }

    /// Convert to a model line, inserting spaces where spans are apart.
    fn into_text_line(self) -> TextLine {
        let mut spans: Vec<TextSpan> = Vec::with_capacity(self.spans.len());
        let mut prev_right: Option<f32> = None;
        let mut prev_ends_space = true;

        for placed in self.spans {
            let mut span = placed.span;
            if let Some(right) = prev_right {
                let gap = placed.x - right;
                let threshold = span.font_size * 0.1;
                if gap > threshold && !prev_ends_space && !span.text.starts_with(char::is_whitespace)
                {
                    span.text.insert(0, ' ');
                }
            }
            prev_right = Some(placed.x + placed.width);
            prev_ends_space = span.text.ends_with(char::is_whitespace);
            spans.push(span);
        }

        TextLine::new(spans)
    }
}

/// Group spans into lines, top to bottom, splitting at wide horizontal gaps.
fn group_lines(mut spans: Vec<PlacedSpan>) -> Vec<LineRun> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut rows: Vec<Vec<PlacedSpan>> = Vec::new();
    for span in spans {
        let tolerance = span.span.font_size * 0.3;
        match rows.last_mut() {
            Some(row) if (row[0].y - span.y).abs() <= tolerance => row.push(span),
            _ => rows.push(vec![span]),
        }
    }

    let mut lines = Vec::new();
    for mut row in rows {
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        let mut current: Vec<PlacedSpan> = Vec::new();
        for span in row {
            if let Some(prev) = current.last() {
                let gap = span.x - prev.right();
                let size = prev.span.font_size.max(span.span.font_size).max(1.0);
                if gap > size * COLUMN_GAP_FACTOR {
                    lines.push(LineRun::new(std::mem::take(&mut current)));
                }
            }
            current.push(span);
        }
        if !current.is_empty() {
            lines.push(LineRun::new(current));
        }
    }
    lines
}

/// Average distance between consecutive distinct baselines.
fn average_line_spacing(lines: &[LineRun]) -> f32 {
    let mut baselines: Vec<f32> = lines.iter().map(|l| l.baseline).collect();
    baselines.dedup_by(|a, b| (*a - *b).abs() < 0.1);

    let spacings: Vec<f32> = baselines
        .windows(2)
        .map(|w| (w[0] - w[1]).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Whether `line` continues the block ending with `last`.
fn continues_block(last: &LineRun, line: &LineRun, avg_spacing: f32) -> bool {
    if !last.overlaps(line.left(), line.right()) {
        return false;
    }
    let spacing = last.baseline - line.baseline;
    if spacing <= 0.0 || spacing > avg_spacing * 1.5 {
        return false;
    }
    if (last.font_size - line.font_size).abs() > 1.0 {
        return false;
    }
    (last.left() - line.left()).abs() <= 20.0
}

/// Group lines into positioned blocks.
pub(crate) fn group_blocks(spans: Vec<PlacedSpan>, frame: &PageFrame) -> Vec<PositionedBlock> {
    let lines = group_lines(spans);
    if lines.is_empty() {
        return Vec::new();
    }
    let avg_spacing = average_line_spacing(&lines);

    let mut open: Vec<Vec<LineRun>> = Vec::new();
    for line in lines {
        let target = open.iter().rposition(|block| {
            block
                .last()
                .map(|last| continues_block(last, &line, avg_spacing))
                .unwrap_or(false)
        });
        match target {
            Some(i) => open[i].push(line),
            None => open.push(vec![line]),
        }
    }

    open.into_iter()
        .map(|lines| {
            let bbox = lines
                .iter()
                .map(|l| l.bbox(frame))
                .reduce(|a, b| a.union(&b))
                .unwrap_or_default();
            let lines = lines.into_iter().map(LineRun::into_text_line).collect();
            PositionedBlock::new(bbox, lines)
        })
        .collect()
}

/// Graphics and text state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    matrix: TextMatrix,
    font_key: Option<Vec<u8>>,
    font_name: String,
    font_size: f32,
    leading: f32,
    metrics: Option<FontMetrics>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            matrix: TextMatrix::default(),
            font_key: None,
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            metrics: None,
        }
    }
}

impl TextState {
    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.matrix.translate_line(0.0, -leading);
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// `self × other`: apply `self` first, then `other`.
    fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        non_zero((self.a * self.a + self.b * self.b).sqrt())
    }

    fn vertical_scale(&self) -> f32 {
        non_zero((self.c * self.c + self.d * self.d).sqrt())
    }
}

fn non_zero(scale: f32) -> f32 {
    if scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Text matrix and line matrix.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Advance the pen by `tx` text-space units after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn to_matrix(&self) -> Matrix {
        Matrix::new(self.a, self.b, self.c, self.d, self.e, self.f)
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
