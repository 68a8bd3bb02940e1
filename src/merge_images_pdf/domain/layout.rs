use serde::{Deserialize, Serialize};

use crate::domain::dimensions::Dimensions;
use crate::domain::error::DomainError;

/// Left margin of the first image in every paired row.
pub const DEFAULT_PAIR_MARGIN: u32 = 66;

/// How paired rows contribute to the canvas height and advance the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowSizing {
    /// Every paired image adds `height / 2` (truncating) to the canvas; the
    /// cursor moves by the height of the second image of each pair.
    #[default]
    HalvedHeights,
    /// Every row adds its tallest image; the cursor moves by that height.
    RowMaxHeight,
}

/// Which placements the canvas width has to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthPolicy {
    /// Widest stacked image only. Paired rows wider than that get clipped.
    #[default]
    StackedOnly,
    /// Widest stacked image or right edge of any paired image, whichever is larger.
    IncludePairedRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedLayoutOptions {
    pub pair_margin: u32,
    pub row_sizing: RowSizing,
    pub width_policy: WidthPolicy,
}

impl Default for MixedLayoutOptions {
    fn default() -> Self {
        Self {
            pair_margin: DEFAULT_PAIR_MARGIN,
            row_sizing: RowSizing::default(),
            width_policy: WidthPolicy::default(),
        }
    }
}

/// Top-left corner of one image on the canvas, plus the image's own size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub size: Dimensions,
}

impl Placement {
    pub fn new(x: i64, y: i64, size: Dimensions) -> Self {
        Self { x, y, size }
    }

    pub fn right(&self) -> i64 {
        self.x + i64::from(self.size.width)
    }

    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.size.height)
    }

    /// True when the whole image lands inside `canvas` without clipping.
    pub fn fits_within(&self, canvas: Dimensions) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(canvas.width)
            && self.bottom() <= i64::from(canvas.height)
    }
}

/// Canvas size and per-image offsets, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub canvas: Dimensions,
    pub placements: Vec<Placement>,
}

impl LayoutPlan {
    /// Placements whose pixels would partly fall outside the canvas.
    pub fn clipped(&self) -> impl Iterator<Item = (usize, &Placement)> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter(move |(_, p)| !p.fits_within(self.canvas))
    }
}

fn checked_total(mut heights: impl Iterator<Item = u32>) -> Result<u32, DomainError> {
    heights.try_fold(0u32, |acc, h| {
        acc.checked_add(h)
            .ok_or_else(|| DomainError::InvalidInput("canvas height exceeds u32::MAX".to_string()))
    })
}

// 最大幅 (空なら0)
fn max_width(images: &[Dimensions]) -> u32 {
    images.iter().map(|d| d.width).max().unwrap_or(0)
}

/// Stacks images top to bottom, left aligned, without gaps.
pub fn plan_stacked(images: &[Dimensions]) -> Result<LayoutPlan, DomainError> {
    let height = checked_total(images.iter().map(|d| d.height))?;
    let mut placements = Vec::with_capacity(images.len());
    let mut y_offset: i64 = 0;
    // 左寄せで上から順に積む
    for size in images {
        placements.push(Placement::new(0, y_offset, *size));
        y_offset += i64::from(size.height);
    }

    Ok(LayoutPlan {
        canvas: Dimensions::new(max_width(images), height),
        placements,
    })
}

/// Stacked column first, then the paired group two per row.
///
/// The second image of a pair starts at the widest paired image's width,
/// not at `pair_margin + first.width`. An odd trailing image sits at
/// `pair_margin` and its row never closes, so the cursor stays put.
pub fn plan_mixed(
    stacked: &[Dimensions],
    paired: &[Dimensions],
    options: &MixedLayoutOptions,
) -> Result<LayoutPlan, DomainError> {
    // まず縦積み部分を配置する
    let stacked_plan = plan_stacked(stacked)?;
    // ペア部分の高さ
    let paired_height = match options.row_sizing {
        RowSizing::HalvedHeights => checked_total(paired.iter().map(|d| d.height / 2))?,
        RowSizing::RowMaxHeight => checked_total(
            paired
                .chunks(2)
                .map(|row| row.iter().map(|d| d.height).max().unwrap_or(0)),
        )?,
    };
    let height = stacked_plan
        .canvas
        .height
        .checked_add(paired_height)
        .ok_or_else(|| DomainError::InvalidInput("canvas height exceeds u32::MAX".to_string()))?;

    let paired_width = i64::from(max_width(paired));
    let margin = i64::from(options.pair_margin);

    let mut y_offset = i64::from(stacked_plan.canvas.height);
    let mut placements = stacked_plan.placements;
    placements.reserve(paired.len());
    // 行の1枚目は左余白から、2枚目はペア画像の最大幅から
    let mut x_offset = margin;
    let mut row_first: Option<Dimensions> = None;

    for size in paired {
        placements.push(Placement::new(x_offset, y_offset, *size));
        match row_first.take() {
            Some(first) => {
                // 2枚目を置いたら次の行へ
                let advance = match options.row_sizing {
                    RowSizing::HalvedHeights => size.height,
                    RowSizing::RowMaxHeight => first.height.max(size.height),
                };
                y_offset += i64::from(advance);
                x_offset = margin;
            }
            None => {
                row_first = Some(*size);
                x_offset = paired_width;
            }
        }
    }

    // ペア画像の右端 (最も右にはみ出す位置)
    let paired_right = placements[stacked.len()..]
        .iter()
        .map(Placement::right)
        .max()
        .unwrap_or(0);
    let paired_right = u32::try_from(paired_right)
        .map_err(|_| DomainError::InvalidInput("canvas width exceeds u32::MAX".to_string()))?;

    let width = match options.width_policy {
        // 縦積みがない場合は幅0になるので、ペア側の右端を使う
        WidthPolicy::StackedOnly if stacked.is_empty() => paired_right,
        WidthPolicy::StackedOnly => stacked_plan.canvas.width,
        WidthPolicy::IncludePairedRows => stacked_plan.canvas.width.max(paired_right),
    };

    Ok(LayoutPlan {
        canvas: Dimensions::new(width, height),
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(list: &[(u32, u32)]) -> Vec<Dimensions> {
        list.iter().copied().map(Dimensions::from).collect()
    }

    #[test]
    fn test_plan_stacked_two_equal_images() {
        let plan = plan_stacked(&dims(&[(100, 50), (100, 50)])).unwrap();
        assert_eq!(plan.canvas, Dimensions::new(100, 100));
        assert_eq!(plan.placements[0], Placement::new(0, 0, Dimensions::new(100, 50)));
        assert_eq!(plan.placements[1], Placement::new(0, 50, Dimensions::new(100, 50)));
        assert_eq!(plan.clipped().count(), 0);
    }

    #[test]
    fn test_plan_stacked_uses_max_width_and_running_offsets() {
        let plan = plan_stacked(&dims(&[(80, 10), (120, 25), (60, 7)])).unwrap();
        assert_eq!(plan.canvas, Dimensions::new(120, 42));
        let offsets: Vec<_> = plan.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(offsets, vec![(0, 0), (0, 10), (0, 35)]);
    }

    #[test]
    fn test_plan_stacked_empty_input_gives_empty_canvas() {
        let plan = plan_stacked(&[]).unwrap();
        assert!(plan.canvas.is_empty());
        assert!(plan.placements.is_empty());
    }

    #[test]
    fn test_plan_stacked_height_overflow_is_rejected() {
        let result = plan_stacked(&dims(&[(1, u32::MAX), (1, 1)]));
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_plan_mixed_halved_heights_truncate_odd_heights() {
        let options = MixedLayoutOptions::default();
        let plan = plan_mixed(
            &dims(&[(300, 100)]),
            &dims(&[(100, 41), (100, 41)]),
            &options,
        )
        .unwrap();
        // 100 + 41 / 2 + 41 / 2 = 100 + 20 + 20
        assert_eq!(plan.canvas.height, 140);
        assert_eq!(plan.canvas.width, 300);
    }

    #[test]
    fn test_plan_mixed_pairs_share_a_row() {
        let options = MixedLayoutOptions::default();
        let plan = plan_mixed(
            &dims(&[(400, 100), (400, 100)]),
            &dims(&[(150, 60), (150, 60), (120, 60), (150, 60)]),
            &options,
        )
        .unwrap();
        let offsets: Vec<_> = plan.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            offsets,
            vec![(0, 0), (0, 100), (66, 200), (150, 200), (66, 260), (150, 260)]
        );
        // 200 + 4 * 30 covers exactly two rows of 60
        assert_eq!(plan.canvas, Dimensions::new(400, 320));
    }

    #[test]
    fn test_plan_mixed_odd_paired_count_leaves_row_open() {
        let options = MixedLayoutOptions::default();
        let plan = plan_mixed(
            &dims(&[(400, 100)]),
            &dims(&[(150, 60), (150, 60), (150, 60)]),
            &options,
        )
        .unwrap();
        let last = plan.placements.last().unwrap();
        assert_eq!((last.x, last.y), (i64::from(DEFAULT_PAIR_MARGIN), 160));
        // 100 + 3 * 30; the dangling image overhangs the canvas by 30 rows.
        assert_eq!(plan.canvas.height, 190);
        let clipped: Vec<_> = plan.clipped().map(|(i, _)| i).collect();
        assert_eq!(clipped, vec![3]);
    }

    #[test]
    fn test_plan_mixed_stacked_only_width_clips_paired_rows() {
        // Known discrepancy: the paired group's width never widens the canvas.
        let options = MixedLayoutOptions::default();
        let plan = plan_mixed(
            &dims(&[(200, 100)]),
            &dims(&[(150, 60), (150, 60)]),
            &options,
        )
        .unwrap();
        assert_eq!(plan.canvas.width, 200);
        let clipped: Vec<_> = plan.clipped().map(|(i, _)| i).collect();
        assert_eq!(clipped, vec![1, 2]);
    }

    #[test]
    fn test_plan_mixed_include_paired_rows_widens_canvas() {
        let options = MixedLayoutOptions {
            width_policy: WidthPolicy::IncludePairedRows,
            ..MixedLayoutOptions::default()
        };
        let plan = plan_mixed(
            &dims(&[(200, 100)]),
            &dims(&[(150, 60), (150, 60)]),
            &options,
        )
        .unwrap();
        assert_eq!(plan.canvas.width, 300);
        assert_eq!(plan.clipped().count(), 0);
    }

    #[test]
    fn test_plan_mixed_row_max_height_tracks_tallest_in_row() {
        let options = MixedLayoutOptions {
            row_sizing: RowSizing::RowMaxHeight,
            width_policy: WidthPolicy::IncludePairedRows,
            ..MixedLayoutOptions::default()
        };
        let plan = plan_mixed(
            &dims(&[(500, 100)]),
            &dims(&[(100, 80), (100, 30), (100, 50)]),
            &options,
        )
        .unwrap();
        let offsets: Vec<_> = plan.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(offsets, vec![(0, 0), (66, 100), (100, 100), (66, 180)]);
        assert_eq!(plan.canvas, Dimensions::new(500, 230));
        assert_eq!(plan.clipped().count(), 0);
    }

    #[test]
    fn test_plan_mixed_without_paired_matches_stacked() {
        let stacked = dims(&[(90, 20), (70, 30)]);
        let mixed = plan_mixed(&stacked, &[], &MixedLayoutOptions::default()).unwrap();
        assert_eq!(mixed, plan_stacked(&stacked).unwrap());
    }

    #[test]
    fn test_plan_mixed_paired_only_uses_paired_right_edge() {
        let plan = plan_mixed(
            &[],
            &dims(&[(30, 20), (30, 20)]),
            &MixedLayoutOptions::default(),
        )
        .unwrap();
        let offsets: Vec<_> = plan.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(offsets, vec![(66, 0), (30, 0)]);
        // 66 + 30; two halved heights of 10
        assert_eq!(plan.canvas, Dimensions::new(96, 20));
        assert_eq!(plan.clipped().count(), 0);
    }

    #[test]
    fn test_mixed_options_deserialize_snake_case() {
        let json = r#"{"row_sizing":"row_max_height","width_policy":"include_paired_rows"}"#;
        let options: MixedLayoutOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.pair_margin, DEFAULT_PAIR_MARGIN);
        assert_eq!(options.row_sizing, RowSizing::RowMaxHeight);
        assert_eq!(options.width_policy, WidthPolicy::IncludePairedRows);
    }
}
