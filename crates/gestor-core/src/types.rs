//! Basic types: transaction kind and the closed category enumeration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};

/// Transaction type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Receita",
            TransactionType::Expense => "Despesa",
        }
    }

    /// Categories allowed for this type, in display order
    pub fn categories(&self) -> &'static [Category] {
        match self {
            TransactionType::Income => &Category::INCOME,
            TransactionType::Expense => &Category::EXPENSE,
        }
    }
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Expense
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category enumeration
///
/// The set is closed: every category belongs to exactly one transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Salary,
    Freelance,
    Investments,
    OtherIncome,
    Food,
    Housing,
    Transport,
    Health,
    Leisure,
    Education,
    Bills,
    Shopping,
    OtherExpense,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 13] = [
        Category::Salary,
        Category::Freelance,
        Category::Investments,
        Category::OtherIncome,
        Category::Food,
        Category::Housing,
        Category::Transport,
        Category::Health,
        Category::Leisure,
        Category::Education,
        Category::Bills,
        Category::Shopping,
        Category::OtherExpense,
    ];

    pub const INCOME: [Category; 4] = [
        Category::Salary,
        Category::Freelance,
        Category::Investments,
        Category::OtherIncome,
    ];

    pub const EXPENSE: [Category; 9] = [
        Category::Food,
        Category::Housing,
        Category::Transport,
        Category::Health,
        Category::Leisure,
        Category::Education,
        Category::Bills,
        Category::Shopping,
        Category::OtherExpense,
    ];

    /// Stable key used on the wire, in files and in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Freelance => "freelance",
            Category::Investments => "investments",
            Category::OtherIncome => "other_income",
            Category::Food => "food",
            Category::Housing => "housing",
            Category::Transport => "transport",
            Category::Health => "health",
            Category::Leisure => "leisure",
            Category::Education => "education",
            Category::Bills => "bills",
            Category::Shopping => "shopping",
            Category::OtherExpense => "other_expense",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Salary => "Salário",
            Category::Freelance => "Freelance",
            Category::Investments => "Investimentos",
            Category::OtherIncome => "Outras Receitas",
            Category::Food => "Alimentação",
            Category::Housing => "Moradia",
            Category::Transport => "Transporte",
            Category::Health => "Saúde",
            Category::Leisure => "Lazer",
            Category::Education => "Educação",
            Category::Bills => "Contas",
            Category::Shopping => "Compras",
            Category::OtherExpense => "Outros",
        }
    }

    /// The transaction type this category belongs to
    pub fn kind(&self) -> TransactionType {
        if Category::INCOME.contains(self) {
            TransactionType::Income
        } else {
            TransactionType::Expense
        }
    }

    /// Whether the category may be used with the given type
    pub fn allows(&self, kind: TransactionType) -> bool {
        self.kind() == kind
    }

    fn default_color(&self) -> &'static str {
        match self {
            Category::Salary => "#10b981",
            Category::Freelance => "#14b8a6",
            Category::Investments => "#0ea5e9",
            Category::OtherIncome => "#22c55e",
            Category::Food => "#f97316",
            Category::Housing => "#6366f1",
            Category::Transport => "#eab308",
            Category::Health => "#ef4444",
            Category::Leisure => "#ec4899",
            Category::Education => "#8b5cf6",
            Category::Bills => "#64748b",
            Category::Shopping => "#f43f5e",
            Category::OtherExpense => "#94a3b8",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Display colour per category, resolved once from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPalette {
    colors: Vec<String>,
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self {
            colors: Category::ALL
                .iter()
                .map(|c| c.default_color().to_string())
                .collect(),
        }
    }
}

impl CategoryPalette {
    /// Build the palette, applying overrides keyed by category key
    ///
    /// Unknown keys are rejected so a typo in the configuration surfaces at
    /// startup instead of as a grey slice in a chart.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> CoreResult<Self> {
        let mut palette = Self::default();
        for (key, color) in overrides {
            let category: Category = key.parse().map_err(|_| CoreError::ConfigError {
                message: format!("unknown category '{}' in categories.colors", key),
            })?;
            palette.colors[category as usize] = color.clone();
        }
        Ok(palette)
    }

    pub fn color(&self, category: Category) -> &str {
        &self.colors[category as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(*c as usize, i);
        }
    }

    #[test]
    fn test_category_kind() {
        assert_eq!(Category::Salary.kind(), TransactionType::Income);
        assert_eq!(Category::Food.kind(), TransactionType::Expense);
        assert!(Category::Bills.allows(TransactionType::Expense));
        assert!(!Category::Bills.allows(TransactionType::Income));
        assert_eq!(
            Category::INCOME.len() + Category::EXPENSE.len(),
            Category::ALL.len()
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" Other_Income ".parse::<Category>().unwrap(), Category::OtherIncome);
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("EXPENSE".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_serde_keys_match_as_str() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }

    #[test]
    fn test_palette_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("food".to_string(), "#000000".to_string());
        let palette = CategoryPalette::from_overrides(&overrides).unwrap();
        assert_eq!(palette.color(Category::Food), "#000000");
        assert_eq!(palette.color(Category::Housing), "#6366f1");
    }

    #[test]
    fn test_palette_rejects_unknown_key() {
        let mut overrides = BTreeMap::new();
        overrides.insert("groceries".to_string(), "#000000".to_string());
        let err = CategoryPalette::from_overrides(&overrides).unwrap_err();
        assert!(matches!(err, CoreError::ConfigError { .. }));
    }
}
