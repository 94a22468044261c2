use crate::domain::document::Document;

/// Assemble evidence documents into the context block handed to the generator
///
/// Each document is numbered and, when known, followed by its source line.
pub fn render_context(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents were retrieved.".to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| match doc.source() {
            Some(source) => format!(
                "[{}] {}\nSource: {}",
                i + 1,
                doc.content.trim(),
                source.replace('\n', " - ")
            ),
            None => format!("[{}] {}", i + 1, doc.content.trim()),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_context_numbers_documents() {
        let docs = vec![
            Document::new("Vectors are stored in an index."),
            Document::new("Qdrant is a vector DB.").with_source("Qdrant\nhttps://qdrant.tech"),
        ];

        let context = render_context(&docs);

        assert_eq!(
            context,
            "[1] Vectors are stored in an index.\n\n[2] Qdrant is a vector DB.\nSource: Qdrant - https://qdrant.tech"
        );
    }

    #[test]
    fn test_render_context_empty() {
        assert_eq!(render_context(&[]), "No documents were retrieved.");
    }
}
