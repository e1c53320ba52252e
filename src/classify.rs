use crate::config::{ClassifierConfig, ShapeBands, SomatotypeBands};
use crate::measure::{MeasurementKind, MeasurementSet};
use serde::Serialize;
use tracing::debug;

/// 体型タイプ（横方向の比率から判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeType {
    Triangle,
    InvertedTriangle,
    Rectangle,
    Hourglass,
    Unknown,
}

/// 体質タイプ（縦方向の比率から判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Somatotype {
    Ectomorph,
    Mesomorph,
    Endomorph,
    Unknown,
}

/// 分類結果。MeasurementSetから常に導出できる純粋な値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub shape_type: ShapeType,
    pub somatotype: Somatotype,
}

/// 体型分類器
///
/// 判定バンドは順番に評価し最初に一致したものを採用する
/// 必要な比率が欠けている場合はUnknownに劣化し、決して失敗しない
pub struct ShapeClassifier {
    shape: ShapeBands,
    somatotype: SomatotypeBands,
}

impl ShapeClassifier {
    pub fn new() -> Self {
        Self {
            shape: ShapeBands::default(),
            somatotype: SomatotypeBands::default(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            shape: config.shape,
            somatotype: config.somatotype,
        }
    }

    pub fn classify(&self, set: &MeasurementSet) -> Classification {
        let shape_type = self.shape_type(set);
        let somatotype = self.somatotype(set);
        debug!(?shape_type, ?somatotype, "classified");
        Classification {
            shape_type,
            somatotype,
        }
    }

    /// S = 肩/腰比, W = ウエスト/腰比。両方必須
    fn shape_type(&self, set: &MeasurementSet) -> ShapeType {
        let (s, w) = match (
            set.get(MeasurementKind::ShoulderHipRatio),
            set.get(MeasurementKind::WaistHipRatio),
        ) {
            (Some(s), Some(w)) => (s, w),
            _ => return ShapeType::Unknown,
        };
        let b = &self.shape;

        // バンドは網羅的でないため順序評価 + 最後のフォールバックが必要
        if s > b.wide_shoulder && w < b.slim_waist {
            ShapeType::InvertedTriangle
        } else if s < b.narrow_shoulder && w >= b.slim_waist {
            ShapeType::Triangle
        } else if (s - 1.0).abs() <= b.balanced_tolerance
            && w >= b.slim_waist
            && w <= b.straight_waist_max
        {
            ShapeType::Rectangle
        } else if w < b.defined_waist {
            ShapeType::Hourglass
        } else {
            ShapeType::Rectangle
        }
    }

    /// sh = 肩幅/身長, lh = 脚長/身長。身長は正であること
    /// Endomorphがキャッチオール（下流がこの性質に依存している）
    fn somatotype(&self, set: &MeasurementSet) -> Somatotype {
        let height = match set.get(MeasurementKind::Height) {
            Some(h) if h > 0.0 => h,
            _ => return Somatotype::Unknown,
        };
        let (shoulder, leg) = match (
            set.get(MeasurementKind::ShoulderWidth),
            set.get(MeasurementKind::LegLength),
        ) {
            (Some(s), Some(l)) => (s, l),
            _ => return Somatotype::Unknown,
        };
        let sh = shoulder / height;
        let lh = leg / height;
        let b = &self.somatotype;

        if sh < b.shoulder_height_slim && lh > b.leg_height_long {
            Somatotype::Ectomorph
        } else if (b.shoulder_height_slim..=b.shoulder_height_broad).contains(&sh)
            && (b.leg_height_short..=b.leg_height_long).contains(&lh)
        {
            Somatotype::Mesomorph
        } else {
            Somatotype::Endomorph
        }
    }
}

impl Default for ShapeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 比率・計測値を直接詰めたセットを作る
    fn set_with(values: &[(MeasurementKind, f32)]) -> MeasurementSet {
        let mut set = MeasurementSet::empty();
        for &(kind, v) in values {
            set.record(kind, v);
        }
        set
    }

    #[test]
    fn test_empty_set_is_unknown() {
        let c = ShapeClassifier::new();
        let result = c.classify(&MeasurementSet::empty());
        assert_eq!(result.shape_type, ShapeType::Unknown);
        assert_eq!(result.somatotype, Somatotype::Unknown);
    }

    #[test]
    fn test_inverted_triangle() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 1.2),
            (MeasurementKind::WaistHipRatio, 0.8),
        ]);
        // W < 0.85 でもルール1が先に一致する（Hourglassにならない）
        assert_eq!(c.classify(&set).shape_type, ShapeType::InvertedTriangle);
    }

    #[test]
    fn test_triangle() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 0.85),
            (MeasurementKind::WaistHipRatio, 0.95),
        ]);
        assert_eq!(c.classify(&set).shape_type, ShapeType::Triangle);
    }

    #[test]
    fn test_rectangle_balanced() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 1.0),
            (MeasurementKind::WaistHipRatio, 1.0),
        ]);
        assert_eq!(c.classify(&set).shape_type, ShapeType::Rectangle);
    }

    #[test]
    fn test_hourglass() {
        // 肩広め(1.1)だがルール1の1.15には届かず、W < 0.85
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 1.1),
            (MeasurementKind::WaistHipRatio, 0.8),
        ]);
        assert_eq!(c.classify(&set).shape_type, ShapeType::Hourglass);
    }

    #[test]
    fn test_rectangle_fallback() {
        // どのバンドにも一致しない組み合わせ
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 1.2),
            (MeasurementKind::WaistHipRatio, 1.1),
        ]);
        assert_eq!(c.classify(&set).shape_type, ShapeType::Rectangle);
    }

    #[test]
    fn test_missing_ratio_is_unknown_shape() {
        let c = ShapeClassifier::new();
        let set = set_with(&[(MeasurementKind::ShoulderHipRatio, 1.2)]);
        assert_eq!(c.classify(&set).shape_type, ShapeType::Unknown);
    }

    #[test]
    fn test_ectomorph() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::Height, 1000.0),
            (MeasurementKind::ShoulderWidth, 200.0), // sh = 0.20
            (MeasurementKind::LegLength, 560.0),     // lh = 0.56
        ]);
        assert_eq!(c.classify(&set).somatotype, Somatotype::Ectomorph);
    }

    #[test]
    fn test_mesomorph() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::Height, 1000.0),
            (MeasurementKind::ShoulderWidth, 250.0), // sh = 0.25
            (MeasurementKind::LegLength, 510.0),     // lh = 0.51
        ]);
        assert_eq!(c.classify(&set).somatotype, Somatotype::Mesomorph);
    }

    #[test]
    fn test_mesomorph_band_boundaries_inclusive() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::Height, 1000.0),
            (MeasurementKind::ShoulderWidth, 230.0), // sh = 0.23 ちょうど
            (MeasurementKind::LegLength, 530.0),     // lh = 0.53 ちょうど
        ]);
        assert_eq!(c.classify(&set).somatotype, Somatotype::Mesomorph);
    }

    #[test]
    fn test_endomorph_catch_all() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::Height, 1000.0),
            (MeasurementKind::ShoulderWidth, 300.0), // sh = 0.30
            (MeasurementKind::LegLength, 450.0),     // lh = 0.45
        ]);
        assert_eq!(c.classify(&set).somatotype, Somatotype::Endomorph);
    }

    #[test]
    fn test_missing_height_is_unknown_somatotype() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderWidth, 250.0),
            (MeasurementKind::LegLength, 510.0),
        ]);
        assert_eq!(c.classify(&set).somatotype, Somatotype::Unknown);
    }

    #[test]
    fn test_zero_height_is_unknown_somatotype() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::Height, 0.0),
            (MeasurementKind::ShoulderWidth, 250.0),
            (MeasurementKind::LegLength, 510.0),
        ]);
        assert_eq!(c.classify(&set).somatotype, Somatotype::Unknown);
    }

    #[test]
    fn test_classification_serializes_as_strings() {
        let c = ShapeClassifier::new();
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 1.2),
            (MeasurementKind::WaistHipRatio, 0.8),
        ]);
        let json = serde_json::to_value(c.classify(&set)).unwrap();
        assert_eq!(json["shape_type"], "InvertedTriangle");
        assert_eq!(json["somatotype"], "Unknown");
    }

    #[test]
    fn test_pipeline_with_occluded_hips() {
        use crate::measure::MeasurementExtractor;
        use crate::pose::{Keypoint, KeypointScheme};

        let mut kps = vec![Keypoint::default(); 17];
        kps[5] = Keypoint::new(100.0, 50.0, 0.9);
        kps[6] = Keypoint::new(200.0, 50.0, 0.9);
        kps[11] = Keypoint::new(110.0, 200.0, 0.2); // 左腰が隠れている
        kps[12] = Keypoint::new(190.0, 200.0, 0.9);
        kps[15] = Keypoint::new(110.0, 400.0, 0.9);
        kps[16] = Keypoint::new(190.0, 400.0, 0.9);

        let ex = MeasurementExtractor::new(KeypointScheme::coco17());
        let set = ex.extract(&kps, None).unwrap();
        let result = ShapeClassifier::new().classify(&set);

        // 比率が導出できない → 分類はUnknownに劣化するが失敗はしない
        assert_eq!(result.shape_type, ShapeType::Unknown);
        assert_eq!(result.somatotype, Somatotype::Unknown);
    }

    #[test]
    fn test_tuned_bands_change_decision() {
        // 閾値を設定で動かせること
        let mut config = ClassifierConfig::default();
        config.shape.wide_shoulder = 1.3;
        let c = ShapeClassifier::from_config(&config);
        let set = set_with(&[
            (MeasurementKind::ShoulderHipRatio, 1.2),
            (MeasurementKind::WaistHipRatio, 0.8),
        ]);
        // 1.2はもう「肩幅広め」ではない → Hourglassバンドに落ちる
        assert_eq!(c.classify(&set).shape_type, ShapeType::Hourglass);
    }
}
