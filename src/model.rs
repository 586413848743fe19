// model.rs - which avatar variant to show, derived from the user's latest body records

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    fn key(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Latest records feeding the avatar choice. Any of them may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Gender,
    #[serde(default)]
    pub height_cm: Option<f32>,
    #[serde(default)]
    pub weight_kg: Option<f32>,
    #[serde(default)]
    pub body_fat_percentage: Option<f32>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            height_cm: None,
            weight_kg: None,
            body_fat_percentage: None,
        }
    }
}

impl UserProfile {
    pub fn bmi(&self) -> Option<f32> {
        let height_m = self.height_cm.filter(|h| *h > 0.0)? / 100.0;
        let weight = self.weight_kg.filter(|w| *w > 0.0)?;
        Some(weight / (height_m * height_m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightBracket {
    Short,
    Average,
    Tall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildBracket {
    Slim,
    Average,
    Heavy,
    Obese,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyFatBracket {
    Lean,
    Fit,
    Soft,
    High,
}

impl HeightBracket {
    fn classify(gender: Gender, height_cm: Option<f32>) -> Self {
        let Some(h) = height_cm.filter(|h| *h > 0.0) else {
            return HeightBracket::Average;
        };
        let (short, tall) = match gender {
            Gender::Male => (167.0, 182.0),
            Gender::Female => (156.0, 170.0),
        };
        if h < short {
            HeightBracket::Short
        } else if h < tall {
            HeightBracket::Average
        } else {
            HeightBracket::Tall
        }
    }

    fn key(self) -> &'static str {
        match self {
            HeightBracket::Short => "short",
            HeightBracket::Average => "average",
            HeightBracket::Tall => "tall",
        }
    }
}

impl BuildBracket {
    fn classify(bmi: Option<f32>) -> Self {
        match bmi {
            None => BuildBracket::Average,
            Some(b) if b < 18.5 => BuildBracket::Slim,
            Some(b) if b < 25.0 => BuildBracket::Average,
            Some(b) if b < 30.0 => BuildBracket::Heavy,
            Some(_) => BuildBracket::Obese,
        }
    }

    fn key(self) -> &'static str {
        match self {
            BuildBracket::Slim => "slim",
            BuildBracket::Average => "average",
            BuildBracket::Heavy => "heavy",
            BuildBracket::Obese => "obese",
        }
    }
}

impl BodyFatBracket {
    fn classify(gender: Gender, body_fat: Option<f32>) -> Self {
        let Some(bf) = body_fat.filter(|bf| *bf >= 0.0) else {
            return BodyFatBracket::Fit;
        };
        let (lean, fit, soft) = match gender {
            Gender::Male => (12.0, 20.0, 28.0),
            Gender::Female => (20.0, 28.0, 35.0),
        };
        if bf < lean {
            BodyFatBracket::Lean
        } else if bf < fit {
            BodyFatBracket::Fit
        } else if bf < soft {
            BodyFatBracket::Soft
        } else {
            BodyFatBracket::High
        }
    }

    fn key(self) -> &'static str {
        match self {
            BodyFatBracket::Lean => "lean",
            BodyFatBracket::Fit => "fit",
            BodyFatBracket::Soft => "soft",
            BodyFatBracket::High => "high",
        }
    }
}

/// Key naming one avatar variant; equal keys mean an identical model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelIdentity {
    pub gender: Gender,
    pub height: HeightBracket,
    pub build: BuildBracket,
    pub body_fat: BodyFatBracket,
}

impl ModelIdentity {
    pub fn for_profile(profile: &UserProfile) -> Self {
        Self {
            gender: profile.gender,
            height: HeightBracket::classify(profile.gender, profile.height_cm),
            build: BuildBracket::classify(profile.bmi()),
            body_fat: BodyFatBracket::classify(profile.gender, profile.body_fat_percentage),
        }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.gender.key(),
            self.height.key(),
            self.build.key(),
            self.body_fat.key()
        )
    }
}

/// Stored avatar colour selector. 1 is the stock texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvatarColor {
    White,
    #[default]
    Yellow,
    Blue,
}

impl AvatarColor {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(AvatarColor::White),
            1 => Some(AvatarColor::Yellow),
            2 => Some(AvatarColor::Blue),
            _ => None,
        }
    }

    pub fn rgb(self) -> [f32; 3] {
        match self {
            AvatarColor::White => [0.92, 0.92, 0.95],
            AvatarColor::Yellow => [0.95, 0.78, 0.32],
            AvatarColor::Blue => [0.35, 0.55, 0.92],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gender: Gender, h: f32, w: f32, bf: f32) -> UserProfile {
        UserProfile {
            gender,
            height_cm: Some(h),
            weight_kg: Some(w),
            body_fat_percentage: Some(bf),
        }
    }

    #[test]
    fn key_combines_all_brackets() {
        let id = ModelIdentity::for_profile(&profile(Gender::Male, 180.0, 75.0, 15.0));
        assert_eq!(id.key(), "male_average_average_fit");
        let id = ModelIdentity::for_profile(&profile(Gender::Female, 150.0, 60.0, 36.0));
        assert_eq!(id.key(), "female_short_heavy_high");
    }

    #[test]
    fn missing_records_fall_into_middle_brackets() {
        let id = ModelIdentity::for_profile(&UserProfile {
            gender: Gender::Female,
            ..UserProfile::default()
        });
        assert_eq!(id.key(), "female_average_average_fit");
    }

    #[test]
    fn small_record_changes_inside_a_bracket_keep_the_key() {
        let a = ModelIdentity::for_profile(&profile(Gender::Male, 175.0, 70.0, 14.0));
        let b = ModelIdentity::for_profile(&profile(Gender::Male, 175.5, 70.4, 14.6));
        assert_eq!(a, b);
    }

    #[test]
    fn bmi_needs_both_height_and_weight() {
        let mut p = profile(Gender::Male, 200.0, 100.0, 10.0);
        assert_eq!(p.bmi(), Some(25.0));
        p.height_cm = None;
        assert_eq!(p.bmi(), None);
    }

    #[test]
    fn profile_parses_from_json() {
        let p: UserProfile = serde_json::from_str(r#"{"gender":"female","weight_kg":55.0}"#)
            .expect("valid profile");
        assert_eq!(p.gender, Gender::Female);
        assert_eq!(p.weight_kg, Some(55.0));
        assert_eq!(p.height_cm, None);
    }

    #[test]
    fn avatar_color_selector() {
        assert_eq!(AvatarColor::from_raw(1), Some(AvatarColor::Yellow));
        assert_eq!(AvatarColor::from_raw(9), None);
    }
}
