// crates/recipe-box-core/src/model/update.rs
// ============================================================================
// Module: Partial-Update Assembler
// Description: Builds parameterized UPDATE statements from sparse change sets.
// Purpose: Keep column order and parameter order structurally in lockstep.
// Dependencies: crate::model::{identifiers, recipe}
// ============================================================================

//! ## Overview
//! An [`UpdateStatement`] is a list of typed [`Assignment`]s plus the target
//! [`RecipeId`]. SQL text and bound parameters are produced by a single pass
//! over that list in [`UpdateStatement::render`], so placeholder `?n` always
//! binds the value of the `n`-th assignment and the identifier is always the
//! final parameter.
//!
//! The base columns `name`, `ingredients`, `steps` and `category` are always
//! assigned, using `COALESCE(?n, column)` so an absent value keeps what is
//! stored. The `image` column is assigned only when a replacement attachment
//! was supplied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::identifiers::RecipeId;
use crate::model::recipe::RecipeChanges;
use crate::model::recipe::RecipeRow;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Relational table holding recipe rows.
pub const RECIPES_TABLE: &str = "recipes";

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Writable recipe columns.
///
/// # Invariants
/// - Column names are static; caller input never reaches statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeColumn {
    /// `name` column.
    Name,
    /// `image` column (comma-joined attachment paths).
    Image,
    /// `ingredients` column.
    Ingredients,
    /// `steps` column.
    Steps,
    /// `first_name` column.
    FirstName,
    /// `last_name` column.
    LastName,
    /// `category` column.
    Category,
}

impl RecipeColumn {
    /// Returns the SQL column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Image => "image",
            Self::Ingredients => "ingredients",
            Self::Steps => "steps",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Category => "category",
        }
    }

    /// Returns a mutable reference to this column within a row.
    fn slot(self, row: &mut RecipeRow) -> &mut String {
        match self {
            Self::Name => &mut row.name,
            Self::Image => &mut row.image,
            Self::Ingredients => &mut row.ingredients,
            Self::Steps => &mut row.steps,
            Self::FirstName => &mut row.first_name,
            Self::LastName => &mut row.last_name,
            Self::Category => &mut row.category,
        }
    }
}

/// How an assignment treats an absent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMode {
    /// `column = ?n`; the value is always present.
    Overwrite,
    /// `column = COALESCE(?n, column)`; a NULL parameter keeps the stored value.
    KeepWhenAbsent,
}

/// Single `SET` clause entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Target column.
    column: RecipeColumn,
    /// Bound value; `None` binds NULL.
    value: Option<String>,
    /// Absent-value behavior.
    mode: AssignmentMode,
}

impl Assignment {
    /// Returns the target column.
    #[must_use]
    pub const fn column(&self) -> RecipeColumn {
        self.column
    }

    /// Returns the bound value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the absent-value behavior.
    #[must_use]
    pub const fn mode(&self) -> AssignmentMode {
        self.mode
    }
}

// ============================================================================
// SECTION: Statement
// ============================================================================

/// Bound statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementParam {
    /// Text value.
    Text(String),
    /// SQL NULL.
    Null,
    /// Integer value (row identifiers).
    Integer(i64),
}

/// SQL text plus parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatement {
    /// Statement text with numbered `?n` placeholders.
    pub sql: String,
    /// Parameters; index `n - 1` binds placeholder `?n`.
    pub params: Vec<StatementParam>,
}

/// Assembled partial update for one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    /// Row the update is scoped to.
    recipe_id: RecipeId,
    /// Ordered `SET` assignments.
    assignments: Vec<Assignment>,
}

impl UpdateStatement {
    /// Assembles the update for `recipe_id` from a sparse change set.
    #[must_use]
    pub fn assemble(recipe_id: RecipeId, changes: &RecipeChanges) -> Self {
        let base = [
            (RecipeColumn::Name, &changes.name),
            (RecipeColumn::Ingredients, &changes.ingredients),
            (RecipeColumn::Steps, &changes.steps),
            (RecipeColumn::Category, &changes.category),
        ];
        let mut assignments: Vec<Assignment> = base
            .into_iter()
            .map(|(column, value)| Assignment {
                column,
                value: value.clone(),
                mode: AssignmentMode::KeepWhenAbsent,
            })
            .collect();
        if let Some(image) = &changes.image {
            assignments.push(Assignment {
                column: RecipeColumn::Image,
                value: Some(image.as_str().to_string()),
                mode: AssignmentMode::Overwrite,
            });
        }
        Self {
            recipe_id,
            assignments,
        }
    }

    /// Returns the target recipe.
    #[must_use]
    pub const fn recipe_id(&self) -> RecipeId {
        self.recipe_id
    }

    /// Returns the ordered assignments.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the assigned columns in statement order.
    #[must_use]
    pub fn columns(&self) -> Vec<RecipeColumn> {
        self.assignments.iter().map(Assignment::column).collect()
    }

    /// Renders SQL text and parameters in one pass.
    #[must_use]
    pub fn render(&self) -> RenderedStatement {
        let mut sql = format!("UPDATE {RECIPES_TABLE} SET ");
        let mut params = Vec::with_capacity(self.assignments.len() + 1);
        for assignment in &self.assignments {
            if !params.is_empty() {
                sql.push_str(", ");
            }
            params.push(assignment.value.clone().map_or(StatementParam::Null, StatementParam::Text));
            let placeholder = params.len();
            let column = assignment.column.as_str();
            let clause = match assignment.mode {
                AssignmentMode::Overwrite => format!("{column} = ?{placeholder}"),
                AssignmentMode::KeepWhenAbsent => {
                    format!("{column} = COALESCE(?{placeholder}, {column})")
                }
            };
            sql.push_str(&clause);
        }
        params.push(StatementParam::Integer(self.recipe_id.get()));
        sql.push_str(&format!(" WHERE id = ?{}", params.len()));
        RenderedStatement {
            sql,
            params,
        }
    }

    /// Applies the statement to an in-memory row with the same semantics as
    /// the rendered SQL.
    pub fn apply_to(&self, row: &mut RecipeRow) {
        for assignment in &self.assignments {
            if let Some(value) = &assignment.value {
                value.clone_into(assignment.column.slot(row));
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
