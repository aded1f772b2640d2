// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "vi";

// (chave, vietnamita, inglês)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation", "Một hoặc nhiều trường không hợp lệ.", "One or more fields are invalid."),
    ("email_exists", "Email đã được đăng ký. Vui lòng sử dụng email khác.", "This e-mail is already registered."),
    ("invalid_credentials", "Email hoặc mật khẩu không đúng.", "Invalid e-mail or password."),
    ("invalid_token", "Phiên đăng nhập không hợp lệ. Vui lòng đăng nhập lại.", "Missing or invalid authentication token."),
    ("listing_not_found", "Không tìm thấy khách sạn.", "Listing not found."),
    ("room_not_found", "Không tìm thấy loại phòng \"{room}\".", "Room type \"{room}\" not found."),
    ("order_not_found", "Không tìm thấy đơn đặt phòng.", "Booking not found."),
    ("insufficient_inventory", "Chỉ còn {available} phòng cho loại phòng đã chọn.", "Only {available} room(s) left for the selected type."),
    ("invalid_date_range", "Ngày trả phòng phải sau ngày nhận phòng.", "Check-out date must be after check-in date."),
    ("invalid_room_count", "Số lượng phòng phải lớn hơn 0.", "Room count must be at least 1."),
    ("price_overflow", "Tổng tiền vượt quá giới hạn cho phép.", "Total price is out of range."),
    ("room_unpriced", "Loại phòng này chưa có giá. Vui lòng chọn loại phòng khác.", "This room type has no price yet. Please choose another one."),
    ("order_not_cancellable", "Bạn chỉ có thể hủy đơn đặt phòng khi trạng thái là \"Đang chờ duyệt\".", "Only pending bookings can be cancelled."),
    ("empty_message", "Vui lòng nhập nội dung tin nhắn.", "Message text is required."),
    ("assistant_busy", "AI đang trả lời tin nhắn trước. Vui lòng chờ.", "The assistant is still answering your previous message."),
    ("internal", "Có lỗi xảy ra. Vui lòng thử lại.", "An unexpected error occurred."),
];

// Catálogo de mensagens por idioma. Idioma desconhecido cai no vietnamita.
#[derive(Debug)]
pub struct I18nStore {
    messages: HashMap<(&'static str, &'static str), &'static str>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::with_capacity(MESSAGES.len() * 2);
        for (key, vi, en) in MESSAGES {
            messages.insert(("vi", *key), *vi);
            messages.insert(("en", *key), *en);
        }
        Self { messages }
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(&(lang, key))
            .or_else(|| self.messages.get(&(DEFAULT_LANG, key)))
            .map(|m| m.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    /// Traduz e substitui os marcadores `{nome}` pelos valores dados.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
