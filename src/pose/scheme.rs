/// キーポイントスキームアダプタ
///
/// 検出モデルごとにキーポイント数・部位インデックス・体型補正定数が異なるため、
/// 抽出ロジックを共通化しスキーム側に定数を持たせる
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointScheme {
    pub name: &'static str,
    /// 期待するキーポイント数
    pub keypoint_count: usize,
    pub left_shoulder: usize,
    pub right_shoulder: usize,
    pub left_hip: usize,
    pub right_hip: usize,
    pub left_ankle: usize,
    pub right_ankle: usize,
    /// ウエスト内挿率: 肩→腰スパンのどの位置をウエストとみなすか
    pub waist_interp: f32,
    /// 骨格幅→実幅のマージン拡張係数
    pub shoulder_margin: f32,
    pub hip_margin: f32,
    pub waist_margin: f32,
}

impl KeypointScheme {
    /// COCO 17キーポイント (MoveNet / YOLOv8-pose)
    /// マージンなしの骨格幅をそのまま使う
    pub const fn coco17() -> Self {
        Self {
            name: "coco17",
            keypoint_count: 17,
            left_shoulder: 5,
            right_shoulder: 6,
            left_hip: 11,
            right_hip: 12,
            left_ankle: 15,
            right_ankle: 16,
            waist_interp: 0.6,
            shoulder_margin: 1.0,
            hip_margin: 1.0,
            waist_margin: 1.0,
        }
    }

    /// BlazePose 33ランドマーク (MediaPipe)
    /// 33点版で使われていたマージン拡張係数を維持
    pub const fn blazepose33() -> Self {
        Self {
            name: "blazepose33",
            keypoint_count: 33,
            left_shoulder: 11,
            right_shoulder: 12,
            left_hip: 23,
            right_hip: 24,
            left_ankle: 27,
            right_ankle: 28,
            waist_interp: 0.45,
            shoulder_margin: 1.3,
            hip_margin: 1.25,
            waist_margin: 1.38,
        }
    }

    /// 設定ファイルの名前からスキームを解決
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "coco17" => Some(Self::coco17()),
            "blazepose33" => Some(Self::blazepose33()),
            _ => None,
        }
    }
}

impl Default for KeypointScheme {
    fn default() -> Self {
        Self::coco17()
    }
}
