use std::fmt;

/// Item shapes an exchange package can declare through its `question_type` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemShape {
    /// `multiple_choice_question`, `true_false_question`
    SingleChoice,
    /// `multiple_answers_question`
    MultiSelect,
    /// `short_answer_question`
    ShortAnswer,
    /// `multiple_dropdowns_question`
    MultiBlankChoice,
    Unrecognized(String),
}

impl ItemShape {
    pub fn from_question_type(question_type: &str) -> Self {
        match question_type.trim() {
            "multiple_choice_question" | "true_false_question" => ItemShape::SingleChoice,
            "multiple_answers_question" => ItemShape::MultiSelect,
            "short_answer_question" => ItemShape::ShortAnswer,
            "multiple_dropdowns_question" => ItemShape::MultiBlankChoice,
            other => ItemShape::Unrecognized(other.to_string()),
        }
    }

    /// The `question_type` written on export
    pub fn question_type(&self) -> &str {
        match self {
            ItemShape::SingleChoice => "multiple_choice_question",
            ItemShape::MultiSelect => "multiple_answers_question",
            ItemShape::ShortAnswer => "short_answer_question",
            ItemShape::MultiBlankChoice => "multiple_dropdowns_question",
            ItemShape::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for ItemShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.question_type())
    }
}
