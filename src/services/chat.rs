// src/services/chat.rs
//
// Assistente de IA: classifica a mensagem, consulta o catálogo quando precisa,
// chama o modelo e devolve as mensagens anexadas ao histórico do usuário.

pub mod classifier;
pub mod model;
pub mod prompt;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ListingStore,
    models::chat::ChatMessage,
};
use classifier::{QueryClassifier, QueryRoute};
use model::TextModel;
use prompt::ParsedReply;

pub const GREETING: &str = "👋 Xin chào! Tôi là AI tư vấn du lịch của bạn. Hãy nói yêu cầu (ngân sách, vị trí, số người...) để tôi gợi ý khách sạn phù hợp.";
pub const CONNECTION_ERROR: &str = "❌ Lỗi kết nối tới AI.";

// Mensagens guardadas por usuário, além da saudação
pub const MAX_HISTORY: usize = 100;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct Session {
    transcript: Vec<ChatMessage>,
    in_flight: bool,
    last_used: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(GREETING)],
            in_flight: false,
            last_used: Instant::now(),
        }
    }

    // A saudação (índice 0) fica; descarta as mensagens mais antigas depois dela
    fn append(&mut self, messages: &[ChatMessage]) {
        self.transcript.extend_from_slice(messages);
        let excess = self.transcript.len().saturating_sub(1 + MAX_HISTORY);
        if excess > 0 {
            self.transcript.drain(1..1 + excess);
        }
        self.last_used = Instant::now();
    }
}

type Sessions = Arc<Mutex<HashMap<Uuid, Session>>>;

fn lock(sessions: &Sessions) -> MutexGuard<'_, HashMap<Uuid, Session>> {
    // Um pânico no meio de um append não invalida o mapa
    sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Libera o "ocupado" em qualquer saída, inclusive erro ou cancelamento do request
struct InFlightGuard {
    sessions: Sessions,
    user_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(session) = lock(&self.sessions).get_mut(&self.user_id) {
            session.in_flight = false;
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    listing_repo: Arc<dyn ListingStore>,
    model: Arc<dyn TextModel>,
    classifier: Arc<dyn QueryClassifier>,
    model_retries: u32,
    session_ttl: Duration,
    sessions: Sessions,
}

impl ChatService {
    pub fn new(
        listing_repo: Arc<dyn ListingStore>,
        model: Arc<dyn TextModel>,
        classifier: Arc<dyn QueryClassifier>,
        model_retries: u32,
    ) -> Self {
        Self {
            listing_repo,
            model,
            classifier,
            model_retries,
            session_ttl: DEFAULT_SESSION_TTL,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sessões paradas por mais que `ttl` são descartadas no próximo envio.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    // Ler não cria sessão: usuário sem conversa vê só a saudação
    pub fn transcript(&self, user_id: Uuid) -> Vec<ChatMessage> {
        match lock(&self.sessions).get_mut(&user_id) {
            Some(session) => {
                session.last_used = Instant::now();
                session.transcript.clone()
            }
            None => vec![ChatMessage::assistant(GREETING)],
        }
    }

    /// Envia uma mensagem. Devolve o que foi anexado ao histórico
    /// (a mensagem do usuário seguida das respostas).
    pub async fn send_message(
        &self,
        user_id: Uuid,
        city: Option<&str>,
        text: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyMessage);
        }

        let _guard = self.begin(user_id)?;

        let mut appended = vec![ChatMessage::user(text)];
        appended.extend(self.respond(city, text).await);

        // Tudo de uma vez: o histórico nunca fica com metade de uma troca
        lock(&self.sessions)
            .entry(user_id)
            .or_insert_with(Session::new)
            .append(&appended);

        Ok(appended)
    }

    fn begin(&self, user_id: Uuid) -> Result<InFlightGuard, AppError> {
        let mut sessions = lock(&self.sessions);

        let now = Instant::now();
        let ttl = self.session_ttl;
        sessions.retain(|id, s| {
            *id == user_id || s.in_flight || now.duration_since(s.last_used) < ttl
        });

        let session = sessions.entry(user_id).or_insert_with(Session::new);
        if session.in_flight {
            return Err(AppError::AssistantBusy);
        }
        session.in_flight = true;

        Ok(InFlightGuard {
            sessions: self.sessions.clone(),
            user_id,
        })
    }

    async fn respond(&self, city: Option<&str>, text: &str) -> Vec<ChatMessage> {
        let result = match self.classifier.classify(text) {
            QueryRoute::Catalog => self.answer_from_catalog(city, text).await,
            QueryRoute::General => self
                .generate(&prompt::general_prompt(text))
                .await
                .map(|reply| vec![ChatMessage::assistant(reply)]),
        };

        result.unwrap_or_else(|e| {
            tracing::error!("Falha ao chamar o modelo: {}", e);
            vec![ChatMessage::assistant(CONNECTION_ERROR)]
        })
    }

    async fn answer_from_catalog(
        &self,
        city: Option<&str>,
        text: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let listings = self.listing_repo.list_by_city(city).await?;
        let reply = self
            .generate(&prompt::catalog_prompt(city, &listings, text))
            .await?;

        Ok(match prompt::parse_reply(&reply, &listings) {
            ParsedReply::Suggestions { cards, ask_more } => {
                let mut messages = vec![ChatMessage::suggestions(cards)];
                if let Some(question) = ask_more {
                    messages.push(ChatMessage::assistant(question));
                }
                messages
            }
            ParsedReply::Raw(text) => vec![ChatMessage::assistant(text)],
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let mut attempt = 0;
        loop {
            match self.model.generate(prompt).await {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt < self.model_retries => {
                    attempt += 1;
                    tracing::warn!("Tentativa {} do modelo falhou: {}", attempt, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
