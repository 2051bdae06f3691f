//! Fixed English/Vietnamese message table.
//!
//! Language codes are free-form; anything that is not Vietnamese falls back
//! to English.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Vietnamese,
}

impl Language {
    /// Languages with a hand-written translation. Returns `None` for everything else.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "en" => Some(Language::English),
            "vn" | "vi" => Some(Language::Vietnamese),
            _ => None,
        }
    }

    pub fn or_english(code: &str) -> Self {
        Self::parse(code).unwrap_or(Language::English)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    ErrorOccurred,
    AiServiceOverloaded,
    InputRequired,
    InputRequiredDetail,
    GeneratedTextRequired,
    GeneratedTextRequiredDetail,
    InvalidParameters,
    OffTopicWarning,
    SearchApiKeyMissingTitle,
    SearchApiKeyMissingDetail,
    SearchEngineIdMissingTitle,
    SearchEngineIdMissingDetail,
    SearchFailedTitle,
    SearchFailedStatus,
    SearchFailedDetail,
    SearchExecutionTitle,
    SearchExecutionDetail,
}

pub fn t(message: Message, language: Language) -> &'static str {
    use Language::{English as En, Vietnamese as Vn};
    use Message::*;

    match (message, language) {
        (ErrorOccurred, En) => "An error occurred",
        (ErrorOccurred, Vn) => "Đã xảy ra lỗi",
        (AiServiceOverloaded, En) => {
            "The AI service is currently overloaded or unavailable. Please try again in a few moments."
        }
        (AiServiceOverloaded, Vn) => {
            "Dịch vụ AI hiện đang quá tải hoặc không khả dụng. Vui lòng thử lại sau ít phút."
        }
        (InputRequired, En) => "Input Required",
        (InputRequired, Vn) => "Cần nhập nội dung",
        (InputRequiredDetail, En) => "Please enter some text to process.",
        (InputRequiredDetail, Vn) => "Vui lòng nhập nội dung cần xử lý.",
        (GeneratedTextRequired, En) => "Generated Text Required",
        (GeneratedTextRequired, Vn) => "Cần có nội dung đã tạo",
        (GeneratedTextRequiredDetail, En) => {
            "Please generate some text first before searching for related documents."
        }
        (GeneratedTextRequiredDetail, Vn) => {
            "Vui lòng tạo nội dung trước khi tìm kiếm tài liệu liên quan."
        }
        (InvalidParameters, En) => "Invalid model parameters",
        (InvalidParameters, Vn) => "Tham số mô hình không hợp lệ",
        (OffTopicWarning, En) => {
            "Note: The provided text does not appear to be related to energy auditing. The expanded content below may be less relevant."
        }
        (OffTopicWarning, Vn) => {
            "Lưu ý: Nội dung được cung cấp dường như không liên quan đến kiểm toán năng lượng. Nội dung mở rộng bên dưới có thể kém phù hợp."
        }
        (SearchApiKeyMissingTitle, En) => "API configuration error",
        (SearchApiKeyMissingTitle, Vn) => "Lỗi cấu hình API",
        (SearchApiKeyMissingDetail, En) => {
            "SEARCH_API_KEY (Google CSE API Key) is not configured in the environment. Please check your .env file."
        }
        (SearchApiKeyMissingDetail, Vn) => {
            "SEARCH_API_KEY (Google CSE API Key) chưa được cấu hình trong biến môi trường. Vui lòng kiểm tra tệp .env."
        }
        (SearchEngineIdMissingTitle, En) => "CSE ID configuration error",
        (SearchEngineIdMissingTitle, Vn) => "Lỗi cấu hình CSE ID",
        (SearchEngineIdMissingDetail, En) => {
            "SEARCH_ENGINE_ID (Google CSE ID) is not configured in the environment. Please check your .env file."
        }
        (SearchEngineIdMissingDetail, Vn) => {
            "SEARCH_ENGINE_ID (Google CSE ID) chưa được cấu hình trong biến môi trường. Vui lòng kiểm tra tệp .env."
        }
        (SearchFailedTitle, En) => "Web search error",
        (SearchFailedTitle, Vn) => "Lỗi khi tìm kiếm trên Web",
        (SearchFailedStatus, En) => "Search request failed with status code",
        (SearchFailedStatus, Vn) => "Yêu cầu tìm kiếm thất bại với mã lỗi",
        (SearchFailedDetail, En) => "Details:",
        (SearchFailedDetail, Vn) => "Chi tiết:",
        (SearchExecutionTitle, En) => "Web search execution error",
        (SearchExecutionTitle, Vn) => "Lỗi thực thi tìm kiếm trên Web",
        (SearchExecutionDetail, En) => "An error occurred while performing the search:",
        (SearchExecutionDetail, Vn) => "Đã xảy ra lỗi khi thực hiện tìm kiếm:",
    }
}

/// Looks up a message for a free-form language code.
pub fn t_code(message: Message, language_code: &str) -> &'static str {
    t(message, Language::or_english(language_code))
}
