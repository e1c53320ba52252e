use crate::config::ExtractorConfig;
use crate::measure::set::{MeasurementKind, MeasurementSet};
use crate::pose::{Keypoint, KeypointScheme};
use anyhow::Result;
use thiserror::Error;
use tracing::debug;

/// 呼び出し側の契約違反のみエラーにする
/// 低信頼度キーポイントはエラーではなくフラグで表現する
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeasureError {
    #[error("keypoint count mismatch: scheme {scheme} expects {expected}, got {actual}")]
    KeypointCountMismatch {
        scheme: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// 体型計測抽出器
///
/// キーポイント列から肩幅・腰幅・ウエスト幅・胴長・脚長・身長と比率を計算する
/// 各計測は依存キーポイントの最小信頼度が閾値以上の場合のみ実行（weakest link）
pub struct MeasurementExtractor {
    scheme: KeypointScheme,
    /// 関節計測用の信頼度閾値
    confidence_threshold: f32,
    /// 身長計測用の緩い閾値（シルエット範囲だけ分かればよい）
    height_confidence_threshold: f32,
}

impl MeasurementExtractor {
    pub fn new(scheme: KeypointScheme) -> Self {
        Self {
            scheme,
            confidence_threshold: 0.5,
            height_confidence_threshold: 0.3,
        }
    }

    /// 設定から作成。未知のスキーム名はエラー
    pub fn from_config(config: &ExtractorConfig) -> Result<Self> {
        let scheme = KeypointScheme::by_name(&config.scheme)
            .ok_or_else(|| anyhow::anyhow!("unknown keypoint scheme: {}", config.scheme))?;
        Ok(Self {
            scheme,
            confidence_threshold: config.confidence_threshold,
            height_confidence_threshold: config.height_confidence_threshold,
        })
    }

    pub fn scheme(&self) -> &KeypointScheme {
        &self.scheme
    }

    /// キーポイント列と既知身長(cm)から計測セットを生成
    ///
    /// キーポイント数がスキームと一致しない場合のみErr
    /// それ以外の欠損・低信頼度はフラグfalseとして結果に残る
    pub fn extract(
        &self,
        keypoints: &[Keypoint],
        known_height_cm: Option<f32>,
    ) -> Result<MeasurementSet, MeasureError> {
        if keypoints.len() != self.scheme.keypoint_count {
            return Err(MeasureError::KeypointCountMismatch {
                scheme: self.scheme.name,
                expected: self.scheme.keypoint_count,
                actual: keypoints.len(),
            });
        }

        let mut set = MeasurementSet::empty();

        if let Some(w) = self.pair_width(keypoints, self.scheme.left_shoulder, self.scheme.right_shoulder) {
            set.record(MeasurementKind::ShoulderWidth, w * self.scheme.shoulder_margin);
        }
        if let Some(w) = self.pair_width(keypoints, self.scheme.left_hip, self.scheme.right_hip) {
            set.record(MeasurementKind::HipWidth, w * self.scheme.hip_margin);
        }
        if let Some(w) = self.waist_width(keypoints) {
            set.record(MeasurementKind::WaistWidth, w * self.scheme.waist_margin);
        }
        if let Some(l) = self.torso_length(keypoints) {
            set.record(MeasurementKind::TorsoLength, l);
        }
        if let Some(l) = self.leg_length(keypoints) {
            set.record(MeasurementKind::LegLength, l);
        }
        if let Some(h) = self.height_span(keypoints) {
            set.record(MeasurementKind::Height, h);
        }

        self.derive_ratios(&mut set);
        self.convert_to_cm(&mut set, known_height_cm);

        for kind in MeasurementKind::ALL {
            if !set.is_measured(kind) {
                debug!(measurement = kind.name(), "skipped: low-confidence keypoints");
            }
        }

        Ok(set)
    }

    /// 左右ペアの直線距離。どちらかが閾値未満ならNone
    fn pair_width(&self, keypoints: &[Keypoint], left: usize, right: usize) -> Option<f32> {
        let l = &keypoints[left];
        let r = &keypoints[right];
        if !l.is_valid(self.confidence_threshold) || !r.is_valid(self.confidence_threshold) {
            return None;
        }
        Some(l.distance_to(r))
    }

    /// ウエスト幅の近似
    ///
    /// 骨格キーポイントに直接のウエスト点はないため、
    /// 左右それぞれ肩→腰をwaist_interpで内挿した2点間の距離を使う
    fn waist_width(&self, keypoints: &[Keypoint]) -> Option<f32> {
        let (ls, rs, lh, rh) = self.torso_corners(keypoints)?;
        let w = self.scheme.waist_interp;
        let left = Keypoint::new(ls.x + (lh.x - ls.x) * w, ls.y + (lh.y - ls.y) * w, 1.0);
        let right = Keypoint::new(rs.x + (rh.x - rs.x) * w, rs.y + (rh.y - rs.y) * w, 1.0);
        Some(left.distance_to(&right))
    }

    /// 胴長: 肩中点→腰中点の距離
    fn torso_length(&self, keypoints: &[Keypoint]) -> Option<f32> {
        let (ls, rs, lh, rh) = self.torso_corners(keypoints)?;
        let shoulder_mid = midpoint(ls, rs);
        let hip_mid = midpoint(lh, rh);
        Some(shoulder_mid.distance_to(&hip_mid))
    }

    /// 脚長: 腰中点→足首中点の距離。4点すべて閾値以上が条件
    fn leg_length(&self, keypoints: &[Keypoint]) -> Option<f32> {
        let lh = &keypoints[self.scheme.left_hip];
        let rh = &keypoints[self.scheme.right_hip];
        let la = &keypoints[self.scheme.left_ankle];
        let ra = &keypoints[self.scheme.right_ankle];
        let t = self.confidence_threshold;
        if !lh.is_valid(t) || !rh.is_valid(t) || !la.is_valid(t) || !ra.is_valid(t) {
            return None;
        }
        let hip_mid = midpoint(lh, rh);
        let ankle_mid = midpoint(la, ra);
        Some(hip_mid.distance_to(&ankle_mid))
    }

    /// 身長: 閾値を超えるキーポイントの縦方向スパン
    /// 2点未満しか残らない場合はNone
    fn height_span(&self, keypoints: &[Keypoint]) -> Option<f32> {
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut count = 0usize;
        for kp in keypoints {
            if kp.is_valid(self.height_confidence_threshold) {
                min_y = min_y.min(kp.y);
                max_y = max_y.max(kp.y);
                count += 1;
            }
        }
        if count < 2 {
            return None;
        }
        Some(max_y - min_y)
    }

    /// 両肩・両腰が揃っている場合のみ4点を返す
    fn torso_corners<'a>(
        &self,
        keypoints: &'a [Keypoint],
    ) -> Option<(&'a Keypoint, &'a Keypoint, &'a Keypoint, &'a Keypoint)> {
        let ls = &keypoints[self.scheme.left_shoulder];
        let rs = &keypoints[self.scheme.right_shoulder];
        let lh = &keypoints[self.scheme.left_hip];
        let rh = &keypoints[self.scheme.right_hip];
        let t = self.confidence_threshold;
        if !ls.is_valid(t) || !rs.is_valid(t) || !lh.is_valid(t) || !rh.is_valid(t) {
            return None;
        }
        Some((ls, rs, lh, rh))
    }

    /// 比率の導出。分母は正であることを明示的に確認する
    fn derive_ratios(&self, set: &mut MeasurementSet) {
        let hip = match set.get(MeasurementKind::HipWidth) {
            Some(h) if h > 0.0 => h,
            _ => return,
        };
        if let Some(shoulder) = set.get(MeasurementKind::ShoulderWidth) {
            set.record(MeasurementKind::ShoulderHipRatio, shoulder / hip);
        }
        if let Some(waist) = set.get(MeasurementKind::WaistWidth) {
            set.record(MeasurementKind::WaistHipRatio, waist / hip);
        }
    }

    /// ピクセル→cm換算
    ///
    /// 既知身長と身長計測の両方が正の場合のみ実行
    /// 失敗時はcm_measurementsを空のまま返す（劣化モード、エラーではない）
    fn convert_to_cm(&self, set: &mut MeasurementSet, known_height_cm: Option<f32>) {
        let known = match known_height_cm {
            Some(h) if h > 0.0 => h,
            _ => return,
        };
        let height_px = match set.get(MeasurementKind::Height) {
            Some(h) if h > 0.0 => h,
            _ => {
                debug!("cm conversion skipped: height measurement unavailable");
                return;
            }
        };
        let scale = known / height_px;
        set.scale_cm_per_px = Some(scale);
        for (&kind, &px) in set.pixel_measurements.iter() {
            let value = if kind.is_ratio() { px } else { px * scale };
            set.cm_measurements.insert(kind, value);
        }
    }
}

fn midpoint(a: &Keypoint, b: &Keypoint) -> Keypoint {
    Keypoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, 1.0)
}
