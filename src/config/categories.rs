//! Built-in category seed set.
//!
//! These are written on first start (or whenever the category table loads empty) and
//! are kept by a full reset. Ids are fixed so that exports from different installs agree.

use crate::entities::CategoryModel;
use crate::entities::transaction::TransactionType;

struct Seed {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    color: &'static str,
}

const EXPENSE: &[Seed] = &[
    Seed { id: "food", name: "Food & Dining", icon: "🍽️", color: "#FF6B6B" },
    Seed { id: "transport", name: "Transport", icon: "🚗", color: "#4ECDC4" },
    Seed { id: "shopping", name: "Shopping", icon: "🛍️", color: "#45B7D1" },
    Seed { id: "entertainment", name: "Entertainment", icon: "🎬", color: "#FFA726" },
    Seed { id: "health", name: "Health", icon: "⚕️", color: "#66BB6A" },
    Seed { id: "education", name: "Education", icon: "📚", color: "#AB47BC" },
    Seed { id: "utilities", name: "Utilities", icon: "⚡", color: "#FFCA28" },
    Seed { id: "other", name: "Other", icon: "📦", color: "#78909C" },
];

const INCOME: &[Seed] = &[
    Seed { id: "salary", name: "Salary", icon: "💼", color: "#4CAF50" },
    Seed { id: "bonus", name: "Bonus", icon: "🎁", color: "#8BC34A" },
    Seed { id: "investment", name: "Investment", icon: "📈", color: "#2196F3" },
    Seed { id: "freelance", name: "Freelance", icon: "💻", color: "#FF9800" },
    Seed { id: "other-income", name: "Other Income", icon: "💰", color: "#9C27B0" },
];

fn build(
    seeds: &[Seed],
    category_type: TransactionType,
) -> impl Iterator<Item = CategoryModel> + '_ {
    seeds.iter().map(move |s| CategoryModel {
        id: s.id.to_string(),
        name: s.name.to_string(),
        icon: s.icon.to_string(),
        color: s.color.to_string(),
        category_type,
        budget: None,
        is_default: true,
    })
}

/// The default expense categories followed by the default income categories.
#[must_use]
pub fn default_categories() -> Vec<CategoryModel> {
    build(EXPENSE, TransactionType::Expense)
        .chain(build(INCOME, TransactionType::Income))
        .collect()
}
