//! Font and position signals for positioned blocks.

use crate::model::{BlockMetadata, BoundingBox, FontInfo, PositionInfo, PositionedBlock};

/// Header zone: top 15% of the page.
pub const HEADER_ZONE: f32 = 0.15;
/// Footer zone: bottom 15% of the page.
pub const FOOTER_ZONE: f32 = 0.85;
/// Blocks starting right of this fraction of the width are sidebars.
pub const SIDEBAR_RIGHT: f32 = 0.7;
/// Blocks ending left of this fraction of the width are sidebars.
pub const SIDEBAR_LEFT: f32 = 0.3;

/// Font summary of a block.
///
/// Size is the largest span size, the name is taken from the last span, and
/// a block is bold or italic if any span is.
pub fn font_info(block: &PositionedBlock) -> FontInfo {
    let mut info = FontInfo::default();

    for span in block.spans() {
        info.font_size = info.font_size.max(span.font_size);
        info.font_name = span.font_name.clone();
        info.is_bold |= span.is_bold;
        info.is_italic |= span.is_italic;
    }

    info
}

/// Page-relative geometry of a bounding box.
///
/// Pages with a non-positive width or height yield zeroed geometry.
pub fn position_info(bbox: &BoundingBox, page_width: f32, page_height: f32) -> PositionInfo {
    if page_width <= 0.0 || page_height <= 0.0 {
        return PositionInfo::default();
    }

    PositionInfo {
        relative_x: bbox.x0 / page_width,
        relative_y: bbox.y0 / page_height,
        width_ratio: bbox.width() / page_width,
        height_ratio: bbox.height() / page_height,
        is_header: bbox.y0 < page_height * HEADER_ZONE,
        is_footer: bbox.y1 > page_height * FOOTER_ZONE,
        is_sidebar: bbox.x0 > page_width * SIDEBAR_RIGHT || bbox.x1 < page_width * SIDEBAR_LEFT,
    }
}

/// Font and position signals of a block on a page.
pub fn analyze(block: &PositionedBlock, page_width: f32, page_height: f32) -> BlockMetadata {
    BlockMetadata {
        font_info: font_info(block),
        position_info: position_info(&block.bbox, page_width, page_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TextLine, TextSpan};

    #[test]
    fn test_font_info_aggregates_spans() {
        let block = PositionedBlock::new(
            BoundingBox::default(),
            vec![
                TextLine::new(vec![TextSpan::new("Exercise 1", 16.0, "Times-Bold")]),
                TextLine::new(vec![TextSpan::new("Answer these.", 11.0, "Times-Italic")]),
            ],
        );
        let info = font_info(&block);
        assert_eq!(info.font_size, 16.0);
        assert_eq!(info.font_name, "Times-Italic");
        assert!(info.is_bold);
        assert!(info.is_italic);
    }

    #[test]
    fn test_font_info_without_spans() {
        let block = PositionedBlock::new(BoundingBox::default(), Vec::new());
        assert_eq!(font_info(&block), FontInfo::default());
    }

    #[test]
    fn test_header_and_footer_zones() {
        let header = position_info(&BoundingBox::new(72.0, 50.0, 540.0, 80.0), 612.0, 792.0);
        assert!(header.is_header);
        assert!(!header.is_footer);

        let footer = position_info(&BoundingBox::new(72.0, 700.0, 540.0, 740.0), 612.0, 792.0);
        assert!(!footer.is_header);
        assert!(footer.is_footer);

        let body = position_info(&BoundingBox::new(72.0, 300.0, 540.0, 400.0), 612.0, 792.0);
        assert!(!body.is_header && !body.is_footer && !body.is_sidebar);
    }

    #[test]
    fn test_sidebar_on_either_margin() {
        let right = position_info(&BoundingBox::new(450.0, 300.0, 590.0, 400.0), 612.0, 792.0);
        assert!(right.is_sidebar);

        let left = position_info(&BoundingBox::new(10.0, 300.0, 150.0, 400.0), 612.0, 792.0);
        assert!(left.is_sidebar);
    }

    #[test]
    fn test_ratios() {
        let pos = position_info(&BoundingBox::new(61.2, 79.2, 367.2, 158.4), 612.0, 792.0);
        assert!((pos.relative_x - 0.1).abs() < 1e-6);
        assert!((pos.relative_y - 0.1).abs() < 1e-6);
        assert!((pos.width_ratio - 0.5).abs() < 1e-6);
        assert!((pos.height_ratio - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_page() {
        let pos = position_info(&BoundingBox::new(10.0, 10.0, 20.0, 20.0), 0.0, 792.0);
        assert_eq!(pos, PositionInfo::default());
    }
}
