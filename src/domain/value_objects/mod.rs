use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    To,
    Cc,
    Bcc,
}

impl RecipientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::To => "to",
            RecipientKind::Cc => "cc",
            RecipientKind::Bcc => "bcc",
        }
    }
}

/// One destination address of a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientTarget {
    pub address: String,
    pub kind: RecipientKind,
}

impl RecipientTarget {
    pub fn new(address: impl Into<String>, kind: RecipientKind) -> Self {
        Self {
            address: address.into(),
            kind,
        }
    }

    /// To, then Cc, then Bcc, each in the given order. Duplicates are kept.
    pub fn collect(recipients: &[String], cc: &[String], bcc: &[String]) -> Vec<Self> {
        let tagged = |list: &[String], kind: RecipientKind| {
            list.iter()
                .map(move |address| Self::new(address.clone(), kind))
                .collect::<Vec<_>>()
        };

        let mut targets = Vec::with_capacity(recipients.len() + cc.len() + bcc.len());
        targets.extend(tagged(recipients, RecipientKind::To));
        targets.extend(tagged(cc, RecipientKind::Cc));
        targets.extend(tagged(bcc, RecipientKind::Bcc));
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn collect_keeps_order_and_duplicates() {
        let targets = RecipientTarget::collect(
            &owned(&["a@x.com", "b@x.com"]),
            &owned(&["a@x.com"]),
            &owned(&["d@x.com"]),
        );

        let flat: Vec<_> = targets
            .iter()
            .map(|t| (t.address.as_str(), t.kind))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("a@x.com", RecipientKind::To),
                ("b@x.com", RecipientKind::To),
                ("a@x.com", RecipientKind::Cc),
                ("d@x.com", RecipientKind::Bcc),
            ]
        );
    }

    #[test]
    fn collect_of_nothing_is_empty() {
        assert!(RecipientTarget::collect(&[], &[], &[]).is_empty());
    }
}
