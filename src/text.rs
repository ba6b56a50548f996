//! Report text
//!
//! Every user-facing string lives here, keyed by condition and situation.
//! Reports are written in Russian.

use crate::detectors::InsufficientReason;
use crate::interpretation::Interpretation;
use crate::types::{Condition, SignalEvidence};

/// Disclaimer attached to every assessment
pub const CLINICAL_SAFETY_NOTE: &str = "Это не медицинский диагноз. Оценка построена на эвристиках \
по данным носимого устройства и не заменяет консультацию врача. \
При тревожных симптомах обратись за медицинской помощью.";

/// Human-readable name of a condition
pub fn condition_label(condition: Condition) -> &'static str {
    match condition {
        Condition::SleepApnea => "Подозрение на апноэ сна",
        Condition::Tachycardia => "Подозрение на тахикардию",
        Condition::IllnessOnset => "Подозрение на начало простуды/воспалительного процесса",
    }
}

pub fn interpretation(kind: Interpretation) -> &'static str {
    match kind {
        Interpretation::HighRiskLowConfidence => {
            "Высокий уровень риска при низкой достоверности сигнала: подозрение есть, но данных пока мало."
        }
        Interpretation::HighRiskHighConfidence => {
            "Высокий уровень риска и высокая достоверность сигнала: сигнал устойчивый, стоит проверить у врача."
        }
        Interpretation::LowRisk => {
            "Низкий уровень риска при нормальной достоверности сигнала: явного устойчивого риска по текущим данным нет."
        }
        Interpretation::MonitorTrend => {
            "Сигнал промежуточный: наблюдай динамику и собирай данные дальше."
        }
        Interpretation::InsufficientData => {
            "Недостаточно данных для интерпретации уровня риска и достоверности сигнала."
        }
    }
}

pub fn sleep_apnea_summary(evidence: &SignalEvidence) -> String {
    format!(
        "Обнаружено случаев пониженной частоты дыхания: {}; \
         из них со всплеском пульса: {}; \
         со снижением вариабельности сердечного ритма (HRV): {}.",
        evidence.low_respiratory_events, evidence.hr_spike_events, evidence.hrv_drop_events
    )
}

pub fn tachycardia_summary(episodes: u32) -> String {
    format!("Обнаружено случаев пульса >= 100 уд/мин: {episodes}.")
}

pub fn illness_onset_summary(hr_increase: f64, hrv_change_pct: f64) -> String {
    format!(
        "Оценка по тренду: пульс в состоянии покоя вырос на {hr_increase:.1} уд/мин; \
         HRV изменился на {hrv_change_pct:.1}%. \
         Такое сочетание может быть ранним признаком начала простуды или другого воспалительного процесса."
    )
}

/// Recommendation after a successful evaluation
pub fn recommendation(condition: Condition) -> &'static str {
    match condition {
        Condition::SleepApnea => {
            "Если сигнал повторяется несколько ночей подряд, стоит обсудить результаты с сомнологом \
             и рассмотреть клиническое обследование сна."
        }
        Condition::Tachycardia => {
            "Если такие эпизоды частые или есть симптомы (одышка, слабость, боль в груди), \
             обратись к кардиологу."
        }
        Condition::IllnessOnset => {
            "Если сигнал растет 2-3 дня подряд и есть симптомы (слабость, ломота, температура), \
             снизь нагрузку, следи за самочувствием и при необходимости обратись к врачу."
        }
    }
}

/// Summary and recommendation when a detector could not score
pub fn insufficient(condition: Condition, reason: InsufficientReason) -> (&'static str, &'static str) {
    match (condition, reason) {
        (Condition::SleepApnea, _) => (
            "Недостаточно данных дыхания для оценки.",
            "Проверь, что Apple Watch носится во время сна и данные синхронизируются.",
        ),
        (Condition::Tachycardia, _) => (
            "Недостаточно данных пульса для оценки.",
            "Проверь синхронизацию данных пульса из Apple Health.",
        ),
        (Condition::IllnessOnset, InsufficientReason::TooFewSamples) => (
            "Недостаточно данных по пульсу в покое и HRV для оценки раннего риска болезни.",
            "Продолжай регулярно носить часы, особенно ночью, чтобы собрать больше данных для тренда.",
        ),
        (Condition::IllnessOnset, InsufficientReason::UnstableBaseline) => (
            "Не удалось устойчиво посчитать тренды пульса в покое и HRV.",
            "Проверь полноту синхронизации и повтори анализ позже.",
        ),
    }
}
