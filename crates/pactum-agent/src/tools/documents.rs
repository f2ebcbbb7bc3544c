//! Built-in contract library backing the document-loading tools.
//!
//! A fixed set of sample contracts keyed by document id, so every run over
//! the same id sees the same text.

const CONTRACT_101: &str = "\
Contract #101: Service Agreement between Acme Corp and Globex Ltd.

1. Term. This agreement commences on 2025-01-01 and ends on 2026-01-01.

2. Services. Globex Ltd. will recieve support requests from Acme Corp and resolve them within two business days.

3. Fees. Acme Corp pays a monthly fee of 4,000 EUR, invoiced on the first day of each month.

4. Cancellation. Either party may cancel this agreement by giving 30 days written notice before the end date.

5. Signatures.
Acme Corp: ____________________
Globex Ltd.: ____________________
";

const CONTRACT_102: &str = "\
Contract #102: Software License Agreement between Initech and Umbrella plc.

1. Term. This license commences on 2024-07-01 and ends on 2025-06-30.

2. License. Umbrella plc grants Initech a non-exclusive license to use the software on up to 50 workstations.

3. Cancellation. Initech may terminate the license by giving 60 days written notice to Umbrella plc.

4. Disclaimer. The software is provided as is, without warranty of any kind.

5. Signatures.
Initech: ____________________
Umbrella plc: ____________________
";

/// Ids of every document in the library.
pub const DOCUMENT_IDS: &[u64] = &[101, 102];

/// Full text of a contract.
pub fn load_document(document_id: u64) -> anyhow::Result<&'static str> {
    match document_id {
        101 => Ok(CONTRACT_101),
        102 => Ok(CONTRACT_102),
        other => anyhow::bail!("No contract with document id {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_id_loads() {
        for id in DOCUMENT_IDS {
            let text = load_document(*id).unwrap();
            assert!(text.starts_with(&format!("Contract #{id}:")));
        }
    }

    #[test]
    fn test_unknown_id_fails() {
        let err = load_document(7).unwrap_err();
        assert!(err.to_string().contains("7"));
    }
}
