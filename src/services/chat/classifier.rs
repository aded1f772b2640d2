// src/services/chat/classifier.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoute {
    /// Pergunta sobre hospedagens: consulta o catálogo e pede sugestões em JSON
    Catalog,
    /// Conversa livre
    General,
}

/// Decide para onde vai a mensagem. Implementação trocável (ex.: um classificador de intenção real).
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, text: &str) -> QueryRoute;
}

pub const CATALOG_KEYWORDS: &[&str] = &[
    "giá", "ngân sách", "rẻ", "dưới", "trên", "gần", "trung tâm", "biển",
    "tiện ích", "hồ bơi", "bữa sáng", "đậu xe", "wifi", "gia đình",
    "cặp đôi", "đánh giá", "rating", "xếp hạng", "khuyến mãi", "ưu đãi",
    "phòng trống", "còn phòng", "check in", "check-out", "hủy miễn phí",
    "so sánh", "gợi ý", "recommend", "homestay", "hotel", "khách sạn",
];

// Contém alguma palavra-chave (sem diferenciar maiúsculas)?
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(CATALOG_KEYWORDS)
    }
}

impl QueryClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> QueryRoute {
        let text = text.to_lowercase();
        if self.keywords.iter().any(|k| text.contains(k.as_str())) {
            QueryRoute::Catalog
        } else {
            QueryRoute::General
        }
    }
}
