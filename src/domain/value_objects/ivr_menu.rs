use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvrMenu {
    Main,
    Order,
    Product,
    Support,
}

/// One selectable entry of a menu: a DTMF digit plus spoken keywords.
#[derive(Debug)]
pub struct MenuOption {
    pub digit: &'static str,
    pub keywords: &'static [&'static str],
    pub target: IvrMenu,
}

#[derive(Debug)]
pub struct MenuDefinition {
    pub menu: IvrMenu,
    pub prompt_bn: &'static str,
    pub prompt_en: &'static str,
    pub timeout_secs: u32,
    pub max_attempts: i32,
    pub options: &'static [MenuOption],
    /// Free speech in this menu is answered by the assistant.
    pub conversational: bool,
}

const BACK_TO_MAIN: MenuOption = MenuOption {
    digit: "0",
    keywords: &["main menu", "মূল মেনু"],
    target: IvrMenu::Main,
};

// Indexed by `IvrMenu as usize`.
static MENU_TABLE: [MenuDefinition; 4] = [
    MenuDefinition {
        menu: IvrMenu::Main,
        prompt_bn: "আমাদের হেল্পলাইনে স্বাগতম। অর্ডার সংক্রান্ত তথ্যের জন্য ১ চাপুন বা অর্ডার বলুন। পণ্যের তথ্যের জন্য ২ চাপুন বা পণ্য বলুন। অন্য যেকোনো সাহায্যের জন্য ৩ চাপুন বা সাহায্য বলুন।",
        prompt_en: "Welcome to our helpline. For order information press 1 or say order. For product information press 2 or say product. For anything else press 3 or say support.",
        timeout_secs: 5,
        max_attempts: 3,
        options: &[
            MenuOption {
                digit: "1",
                keywords: &["order", "delivery", "অর্ডার", "ডেলিভারি"],
                target: IvrMenu::Order,
            },
            MenuOption {
                digit: "2",
                keywords: &["product", "price", "পণ্য", "প্রোডাক্ট", "দাম"],
                target: IvrMenu::Product,
            },
            MenuOption {
                digit: "3",
                keywords: &["support", "help", "problem", "সাহায্য", "সমস্যা"],
                target: IvrMenu::Support,
            },
        ],
        conversational: false,
    },
    MenuDefinition {
        menu: IvrMenu::Order,
        prompt_bn: "অনুগ্রহ করে আপনার অর্ডার নম্বর বা আপনার প্রশ্নটি বলুন।",
        prompt_en: "Please say your order number or your question about the order.",
        timeout_secs: 8,
        max_attempts: 3,
        options: &[BACK_TO_MAIN],
        conversational: true,
    },
    MenuDefinition {
        menu: IvrMenu::Product,
        prompt_bn: "কোন পণ্য সম্পর্কে জানতে চান, অনুগ্রহ করে বলুন।",
        prompt_en: "Please tell me which product you would like to know about.",
        timeout_secs: 8,
        max_attempts: 3,
        options: &[BACK_TO_MAIN],
        conversational: true,
    },
    MenuDefinition {
        menu: IvrMenu::Support,
        prompt_bn: "অনুগ্রহ করে আপনার সমস্যাটি সংক্ষেপে বলুন।",
        prompt_en: "Please briefly describe how we can help you.",
        timeout_secs: 10,
        max_attempts: 3,
        options: &[BACK_TO_MAIN],
        conversational: true,
    },
];

impl IvrMenu {
    pub fn definition(self) -> &'static MenuDefinition {
        &MENU_TABLE[self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IvrMenu::Main => "main",
            IvrMenu::Order => "order",
            IvrMenu::Product => "product",
            IvrMenu::Support => "support",
        }
    }
}

impl MenuDefinition {
    pub fn prompt(&self, language: Language) -> &'static str {
        match language {
            Language::English => self.prompt_en,
            Language::Bangla | Language::Auto => self.prompt_bn,
        }
    }

    /// DTMF digits must match exactly; otherwise the transcript is
    /// keyword-matched against each option in table order.
    pub fn match_input(&self, digits: Option<&str>, transcript: Option<&str>) -> Option<IvrMenu> {
        if let Some(digits) = digits.map(str::trim).filter(|d| !d.is_empty()) {
            if let Some(option) = self.options.iter().find(|o| o.digit == digits) {
                return Some(option.target);
            }
        }

        let transcript = transcript.map(|t| t.trim().to_lowercase())?;
        if transcript.is_empty() {
            return None;
        }

        self.options
            .iter()
            .find(|o| o.keywords.iter().any(|k| transcript.contains(k)))
            .map(|o| o.target)
    }
}

impl FromStr for IvrMenu {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(IvrMenu::Main),
            "order" => Ok(IvrMenu::Order),
            "product" => Ok(IvrMenu::Product),
            "support" => Ok(IvrMenu::Support),
            other => Err(format!("Unknown IVR menu: {}", other)),
        }
    }
}
