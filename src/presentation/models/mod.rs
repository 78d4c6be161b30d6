use poem_openapi::Enum;

use crate::domain::value_objects::RecipientKind;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum RecipientKindDto {
    #[oai(rename = "to")]
    To,
    #[oai(rename = "cc")]
    Cc,
    #[oai(rename = "bcc")]
    Bcc,
}

impl From<RecipientKind> for RecipientKindDto {
    fn from(value: RecipientKind) -> Self {
        match value {
            RecipientKind::To => RecipientKindDto::To,
            RecipientKind::Cc => RecipientKindDto::Cc,
            RecipientKind::Bcc => RecipientKindDto::Bcc,
        }
    }
}
