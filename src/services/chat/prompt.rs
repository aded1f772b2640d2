// src/services/chat/prompt.rs
//
// Montagem dos prompts e leitura da resposta JSON do modelo.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{catalog::Listing, chat::SuggestionCard};

pub fn catalog_prompt(city: Option<&str>, listings: &[Listing], question: &str) -> String {
    let context = json!({ "hotels": listings, "city": city });
    let context = serde_json::to_string_pretty(&context).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"
Bạn là AI tư vấn du lịch cho KHÁCH HÀNG.
Thành phố: {city}.

Dữ liệu khách sạn (có trường mainImage là ảnh):
{context}

Trả lời theo định dạng JSON (KHÔNG thêm chữ nào ngoài JSON):
{{
  "type": "suggestions",
  "items": [
    {{"name": string, "pricePerNight": string|number, "rating": number|null, "area": string|null, "amenities": string[], "imageUrl": string|null}}
  ],
  "askMore": string|null
}}

Yêu cầu: chọn 3–5 khách sạn phù hợp; imageUrl lấy từ mainImage; nếu thiếu thông tin → items=[] và điền askMore.
Câu hỏi khách: {question}
"#,
        city = city.unwrap_or("không xác định"),
    )
}

pub fn general_prompt(message: &str) -> String {
    format!(
        r#"
Bạn là trợ lý du lịch thân thiện.
Hãy trả lời tự nhiên, ngắn gọn, tích cực.
Tin nhắn: {message}
"#
    )
}

/// Remove a cerca de Markdown (```json ... ```) que o modelo costuma colocar.
pub fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Pula o rótulo de linguagem, se houver
        s = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    s = s.trim();
    s.strip_suffix("```").unwrap_or(s).trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionEnvelope {
    #[serde(rename = "type")]
    kind: String,
    items: Vec<SuggestionItem>,
    ask_more: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionItem {
    name: String,
    price_per_night: Option<Value>,
    rating: Option<f64>,
    area: Option<String>,
    amenities: Option<Vec<String>>,
    image_url: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum ParsedReply {
    Suggestions {
        cards: Vec<SuggestionCard>,
        ask_more: Option<String>,
    },
    /// Não veio no formato esperado: mostra o texto cru
    Raw(String),
}

// Nome exato primeiro; se o modelo mudou o nome, tenta pela imagem principal
fn match_listing(item: &SuggestionItem, listings: &[Listing]) -> Option<uuid::Uuid> {
    listings
        .iter()
        .find(|l| l.hotel_name == item.name)
        .or_else(|| {
            let url = item.image_url.as_deref()?;
            listings.iter().find(|l| l.main_image.as_deref() == Some(url))
        })
        .map(|l| l.id)
}

pub fn parse_reply(text: &str, listings: &[Listing]) -> ParsedReply {
    let cleaned = strip_code_fence(text);

    let envelope = match serde_json::from_str::<SuggestionEnvelope>(cleaned) {
        Ok(env) if env.kind == "suggestions" => env,
        Ok(_) => return ParsedReply::Raw(text.to_string()),
        Err(e) => {
            tracing::debug!("Resposta do modelo não é JSON de sugestões: {}", e);
            return ParsedReply::Raw(text.to_string());
        }
    };

    let cards = envelope
        .items
        .into_iter()
        .map(|item| {
            let listing_id = match_listing(&item, listings);
            SuggestionCard {
                name: item.name,
                price_per_night: item.price_per_night,
                rating: item.rating,
                area: item.area,
                amenities: item.amenities.unwrap_or_default(),
                image_url: item.image_url,
                listing_id,
            }
        })
        .collect();

    ParsedReply::Suggestions {
        cards,
        ask_more: envelope.ask_more.filter(|s| !s.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{ListingType, Room};
    use uuid::Uuid;

    fn listing(name: &str, image: &str) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            city: "Huế".into(),
            hotel_name: name.into(),
            address: None,
            kind: ListingType::Hotel,
            amenities: vec!["Wifi".into()],
            rating: Some(4.0),
            main_image: Some(image.into()),
            sub_images: vec![],
            owner_id: None,
            rooms: vec![Room { room_type: "Standard".into(), price: 400_000, available: 1 }],
        }
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }

    #[test]
    fn parses_suggestions_and_maps_listings() {
        let a = listing("Hương Giang", "https://img/a.jpg");
        let b = listing("Saigon Morin", "https://img/b.jpg");
        let reply = r#"```json
{
  "type": "suggestions",
  "items": [
    {"name": "Hương Giang", "pricePerNight": 400000, "rating": 4.0, "area": "Trung tâm", "amenities": ["Wifi"], "imageUrl": "https://img/a.jpg"},
    {"name": "Morin Hotel", "pricePerNight": "450.000đ", "rating": null, "area": null, "amenities": null, "imageUrl": "https://img/b.jpg"},
    {"name": "Không có", "pricePerNight": null, "rating": null, "area": null, "amenities": [], "imageUrl": null}
  ],
  "askMore": "Bạn đi mấy người?"
}
```"#;

        let ParsedReply::Suggestions { cards, ask_more } = parse_reply(reply, &[a.clone(), b.clone()]) else {
            panic!("esperava sugestões");
        };
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].listing_id, Some(a.id));
        assert_eq!(cards[1].listing_id, Some(b.id)); // pela imagem
        assert_eq!(cards[1].price_per_night, Some(Value::String("450.000đ".into())));
        assert!(cards[1].amenities.is_empty());
        assert_eq!(cards[2].listing_id, None);
        assert_eq!(ask_more.as_deref(), Some("Bạn đi mấy người?"));
    }

    #[test]
    fn non_json_falls_back_to_raw_text() {
        let reply = "Xin lỗi, tôi không hiểu.";
        assert_eq!(parse_reply(reply, &[]), ParsedReply::Raw(reply.to_string()));
    }

    #[test]
    fn wrong_schema_falls_back_to_raw_text() {
        let reply = r#"{"type": "answer", "items": []}"#;
        assert_eq!(parse_reply(reply, &[]), ParsedReply::Raw(reply.to_string()));
    }

    #[test]
    fn catalog_prompt_embeds_listing_json() {
        let prompt = catalog_prompt(Some("Huế"), &[listing("Hương Giang", "x")], "giá rẻ?");
        assert!(prompt.contains("\"hotelName\": \"Hương Giang\""));
        assert!(prompt.contains("Thành phố: Huế."));
        assert!(prompt.contains("Câu hỏi khách: giá rẻ?"));
        assert!(prompt.contains("\"type\": \"suggestions\""));

        let prompt = catalog_prompt(None, &[], "gợi ý");
        assert!(prompt.contains("không xác định"));
    }
}
