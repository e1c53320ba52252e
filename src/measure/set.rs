use serde::Serialize;
use std::collections::BTreeMap;

/// 計測項目
///
/// 6つの基本計測（ピクセル値）と2つの比率（無次元）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    ShoulderWidth,
    HipWidth,
    WaistWidth,
    TorsoLength,
    LegLength,
    Height,
    ShoulderHipRatio,
    WaistHipRatio,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 8] = [
        MeasurementKind::ShoulderWidth,
        MeasurementKind::HipWidth,
        MeasurementKind::WaistWidth,
        MeasurementKind::TorsoLength,
        MeasurementKind::LegLength,
        MeasurementKind::Height,
        MeasurementKind::ShoulderHipRatio,
        MeasurementKind::WaistHipRatio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MeasurementKind::ShoulderWidth => "shoulder_width",
            MeasurementKind::HipWidth => "hip_width",
            MeasurementKind::WaistWidth => "waist_width",
            MeasurementKind::TorsoLength => "torso_length",
            MeasurementKind::LegLength => "leg_length",
            MeasurementKind::Height => "height",
            MeasurementKind::ShoulderHipRatio => "shoulder_hip_ratio",
            MeasurementKind::WaistHipRatio => "waist_hip_ratio",
        }
    }

    /// 無次元の比率項目か（cm換算でスケールしない）
    pub fn is_ratio(&self) -> bool {
        matches!(
            self,
            MeasurementKind::ShoulderHipRatio | MeasurementKind::WaistHipRatio
        )
    }
}

/// 1フレーム分の計測結果
///
/// キーが存在する ⇔ 対応するconfidence_flagがtrue
/// 全項目失敗でも構造的に完全な値を返す（エラー値は使わない）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSet {
    pub pixel_measurements: BTreeMap<MeasurementKind, f32>,
    pub cm_measurements: BTreeMap<MeasurementKind, f32>,
    pub scale_cm_per_px: Option<f32>,
    pub confidence_flags: BTreeMap<MeasurementKind, bool>,
}

impl MeasurementSet {
    /// 全フラグfalseの空セット
    pub fn empty() -> Self {
        let confidence_flags = MeasurementKind::ALL.iter().map(|&k| (k, false)).collect();
        Self {
            pixel_measurements: BTreeMap::new(),
            cm_measurements: BTreeMap::new(),
            scale_cm_per_px: None,
            confidence_flags,
        }
    }

    /// ピクセル値を記録しフラグを立てる
    pub(crate) fn record(&mut self, kind: MeasurementKind, value: f32) {
        self.pixel_measurements.insert(kind, value);
        self.confidence_flags.insert(kind, true);
    }

    /// 計測済みならピクセル値（比率は無次元値）を返す
    pub fn get(&self, kind: MeasurementKind) -> Option<f32> {
        self.pixel_measurements.get(&kind).copied()
    }

    pub fn is_measured(&self, kind: MeasurementKind) -> bool {
        self.confidence_flags.get(&kind).copied().unwrap_or(false)
    }

    /// 1項目も計測できなかったか（呼び出し側の「検出なし」判定用）
    pub fn is_all_unmeasured(&self) -> bool {
        self.confidence_flags.values().all(|&v| !v)
    }
}

impl Default for MeasurementSet {
    fn default() -> Self {
        Self::empty()
    }
}
