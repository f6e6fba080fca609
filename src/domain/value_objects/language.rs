use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reply language configured for an organization.
///
/// `Auto` asks the model to mirror the customer. Fixed notices and voice
/// prompts have no customer text to mirror, so they fall back to Bangla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "bn")]
    #[default]
    Bangla,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "auto")]
    Auto,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Bangla => "bn",
            Language::English => "en",
            Language::Auto => "auto",
        }
    }

    fn is_english(&self) -> bool {
        matches!(self, Language::English)
    }

    pub fn policy_instruction(&self) -> &'static str {
        match self {
            Language::Bangla => {
                "Always answer in Bangla (Bengali script), even if the customer writes in English."
            }
            Language::English => "Always answer in English.",
            Language::Auto => {
                "Answer in the same language the customer uses. If the customer mixes Bangla and English, answer in Bangla."
            }
        }
    }

    pub fn voice_locale(&self) -> &'static str {
        if self.is_english() { "en-US" } else { "bn-BD" }
    }

    pub fn apology_notice(&self) -> &'static str {
        if self.is_english() {
            "I'm sorry, I'm having trouble answering right now. Please try again in a moment."
        } else {
            "দুঃখিত, এই মুহূর্তে উত্তর দিতে সমস্যা হচ্ছে। অনুগ্রহ করে একটু পরে আবার চেষ্টা করুন।"
        }
    }

    pub fn handoff_notice(&self) -> &'static str {
        if self.is_english() {
            "I'm connecting you with a member of our team who can help you further. Please wait a moment."
        } else {
            "আপনাকে আমাদের একজন প্রতিনিধির সাথে সংযুক্ত করা হচ্ছে। অনুগ্রহ করে একটু অপেক্ষা করুন।"
        }
    }

    pub fn quota_notice(&self) -> &'static str {
        if self.is_english() {
            "Our assistant is unavailable right now. A member of our team will get back to you soon."
        } else {
            "আমাদের সহকারী এই মুহূর্তে উপলব্ধ নয়। আমাদের একজন প্রতিনিধি শীঘ্রই আপনার সাথে যোগাযোগ করবেন।"
        }
    }

    pub fn unsupported_media_notice(&self) -> &'static str {
        if self.is_english() {
            "Sorry, I can only read text messages right now. Please type your question."
        } else {
            "দুঃখিত, আমি এখন শুধু টেক্সট বার্তা পড়তে পারি। অনুগ্রহ করে আপনার প্রশ্নটি লিখে পাঠান।"
        }
    }

    pub fn no_input_notice(&self) -> &'static str {
        if self.is_english() {
            "Sorry, I didn't hear anything."
        } else {
            "দুঃখিত, আমি কিছু শুনতে পাইনি।"
        }
    }

    pub fn no_match_notice(&self) -> &'static str {
        if self.is_english() {
            "Sorry, I didn't understand that choice."
        } else {
            "দুঃখিত, আপনার পছন্দটি বুঝতে পারিনি।"
        }
    }

    pub fn transfer_notice(&self) -> &'static str {
        if self.is_english() {
            "Please hold while I transfer you to a member of our team."
        } else {
            "অনুগ্রহ করে লাইনে থাকুন, আপনাকে আমাদের একজন প্রতিনিধির কাছে স্থানান্তর করা হচ্ছে।"
        }
    }

    pub fn follow_up_prompt(&self) -> &'static str {
        if self.is_english() {
            "Is there anything else I can help you with? Press 0 for the main menu."
        } else {
            "আর কিছু জানতে চান? মূল মেনুতে ফিরে যেতে ০ চাপুন।"
        }
    }

    pub fn goodbye_notice(&self) -> &'static str {
        if self.is_english() {
            "Thank you for calling. Goodbye."
        } else {
            "কল করার জন্য ধন্যবাদ।"
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bn" | "bangla" | "bengali" => Ok(Language::Bangla),
            "en" | "english" => Ok(Language::English),
            "auto" => Ok(Language::Auto),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}
