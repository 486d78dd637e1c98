//! External AI collaborator boundary. The daemon treats the advisor as a
//! black box with three request shapes; calls are single-attempt and a
//! failure never mutates state. The default implementation is the offline
//! (keyless) advisor with deterministic canned responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("advisor returned an unusable response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone)]
pub struct DietAnalysis {
    pub calories: i64,
    pub advice: String,
}

pub trait Advisor {
    /// Meal description plus optional data-URI photo -> calories + advice.
    fn analyze_diet(
        &self,
        description: &str,
        image_data_uri: Option<&str>,
    ) -> Result<DietAnalysis, AdvisorError>;

    /// Monologue/submission text -> coaching feedback.
    fn review_monologue(&self, submission: &str) -> Result<String, AdvisorError>;

    /// Free-text question -> mentor-style answer.
    fn tutor_answer(&self, question: &str) -> Result<String, AdvisorError>;
}

/// Keyless stand-in used when no AI backend is configured.
pub struct OfflineAdvisor;

impl Advisor for OfflineAdvisor {
    fn analyze_diet(
        &self,
        description: &str,
        image_data_uri: Option<&str>,
    ) -> Result<DietAnalysis, AdvisorError> {
        if let Some(uri) = image_data_uri {
            if !uri.starts_with("data:") {
                return Err(AdvisorError::BadResponse(
                    "image must be a data URI".into(),
                ));
            }
        }
        let _ = description;
        Ok(DietAnalysis {
            calories: 0,
            advice: "AI 연동이 설정되지 않아 자동 분석 없이 기록했습니다.".into(),
        })
    }

    fn review_monologue(&self, _submission: &str) -> Result<String, AdvisorError> {
        Ok("AI 연동이 설정되지 않았습니다. 선생님 피드백을 기다려주세요.".into())
    }

    fn tutor_answer(&self, _question: &str) -> Result<String, AdvisorError> {
        Ok("AI 튜터가 아직 연결되지 않았습니다. 선생님의 답변을 기다려주세요.".into())
    }
}

/// Always errors; unit tests use it to pin the failure path.
#[cfg(test)]
pub struct FailingAdvisor;

#[cfg(test)]
impl Advisor for FailingAdvisor {
    fn analyze_diet(
        &self,
        _description: &str,
        _image_data_uri: Option<&str>,
    ) -> Result<DietAnalysis, AdvisorError> {
        Err(AdvisorError::Unavailable("test outage".into()))
    }

    fn review_monologue(&self, _submission: &str) -> Result<String, AdvisorError> {
        Err(AdvisorError::Unavailable("test outage".into()))
    }

    fn tutor_answer(&self, _question: &str) -> Result<String, AdvisorError> {
        Err(AdvisorError::Unavailable("test outage".into()))
    }
}
