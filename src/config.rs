use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractorConfig {
    /// キーポイントスキーム名 ("coco17" / "blazepose33")
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// 関節計測の信頼度閾値
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// 身長計測の信頼度閾値（関節より緩い）
    #[serde(default = "default_height_confidence_threshold")]
    pub height_confidence_threshold: f32,
}

fn default_scheme() -> String { "coco17".to_string() }
fn default_confidence_threshold() -> f32 { 0.5 }
fn default_height_confidence_threshold() -> f32 { 0.3 }

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            confidence_threshold: default_confidence_threshold(),
            height_confidence_threshold: default_height_confidence_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub shape: ShapeBands,
    #[serde(default)]
    pub somatotype: SomatotypeBands,
}

/// 体型タイプ判定の閾値
/// S = 肩/腰比, W = ウエスト/腰比
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ShapeBands {
    /// S がこれを超えたら肩幅広め
    #[serde(default = "default_wide_shoulder")]
    pub wide_shoulder: f32,
    /// S がこれ未満なら肩幅狭め
    #[serde(default = "default_narrow_shoulder")]
    pub narrow_shoulder: f32,
    /// |S - 1.0| がこの範囲内ならバランス型
    #[serde(default = "default_balanced_tolerance")]
    pub balanced_tolerance: f32,
    /// W がこれ未満ならウエスト細め
    #[serde(default = "default_slim_waist")]
    pub slim_waist: f32,
    /// 寸胴判定のWの上限
    #[serde(default = "default_straight_waist_max")]
    pub straight_waist_max: f32,
    /// W がこれ未満ならくびれあり
    #[serde(default = "default_defined_waist")]
    pub defined_waist: f32,
}

fn default_wide_shoulder() -> f32 { 1.15 }
fn default_narrow_shoulder() -> f32 { 0.9 }
fn default_balanced_tolerance() -> f32 { 0.1 }
fn default_slim_waist() -> f32 { 0.9 }
fn default_straight_waist_max() -> f32 { 1.05 }
fn default_defined_waist() -> f32 { 0.85 }

impl Default for ShapeBands {
    fn default() -> Self {
        Self {
            wide_shoulder: default_wide_shoulder(),
            narrow_shoulder: default_narrow_shoulder(),
            balanced_tolerance: default_balanced_tolerance(),
            slim_waist: default_slim_waist(),
            straight_waist_max: default_straight_waist_max(),
            defined_waist: default_defined_waist(),
        }
    }
}

/// 体質タイプ判定の閾値
/// sh = 肩幅/身長, lh = 脚長/身長
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SomatotypeBands {
    #[serde(default = "default_shoulder_height_slim")]
    pub shoulder_height_slim: f32,
    #[serde(default = "default_shoulder_height_broad")]
    pub shoulder_height_broad: f32,
    #[serde(default = "default_leg_height_short")]
    pub leg_height_short: f32,
    #[serde(default = "default_leg_height_long")]
    pub leg_height_long: f32,
}

fn default_shoulder_height_slim() -> f32 { 0.23 }
fn default_shoulder_height_broad() -> f32 { 0.27 }
fn default_leg_height_short() -> f32 { 0.49 }
fn default_leg_height_long() -> f32 { 0.53 }

impl Default for SomatotypeBands {
    fn default() -> Self {
        Self {
            shoulder_height_slim: default_shoulder_height_slim(),
            shoulder_height_broad: default_shoulder_height_broad(),
            leg_height_short: default_leg_height_short(),
            leg_height_long: default_leg_height_long(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// ファイルがない・読めない場合はデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
