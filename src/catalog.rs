use crate::model::{
    AttendanceKind, DocumentCategory, EventKind, OccurrenceNature, OccurrenceType, Shift,
};
use serde_json::json;

const PEDAGOGICAL_REASONS: &[&str] = &[
    "Falta de material escolar",
    "Desinteresse nas atividades",
    "Sono excessivo em aula",
    "Não entrega de tarefas",
    "Dificuldade de aprendizagem acentuada",
];

const BEHAVIORAL_REASONS: &[&str] = &[
    "Conversa excessiva",
    "Uso indevido de celular",
    "Desrespeito moderado a colegas",
    "Brincadeiras inadequadas",
    "Gritos ou barulhos em sala",
];

const SERIOUS_REASONS: &[&str] = &[
    "Agressão física",
    "Bullying ou Cyberbullying",
    "Dano ao patrimônio escolar",
    "Uso de palavras de baixo calão graves",
    "Saída da escola sem autorização",
    "Porte de objetos perigosos",
];

pub const IMMEDIATE_ACTIONS: &[&str] = &[
    "Conversa reflexiva com o aluno",
    "Advertência verbal registrada",
    "Encaminhamento imediato à Coordenação",
    "Mediação de conflito entre partes",
    "Retirada de material perturbador",
    "Mudança de posicionamento em sala",
    "Contato telefônico com responsáveis",
    "Solicitação de agenda escolar para registro",
];

pub const MANAGEMENT_DECISIONS: &[&str] = &[
    "Convocação dos pais/responsáveis para reunião",
    "Suspensão disciplinar (1 a 3 dias)",
    "Assinatura de Termo de Compromisso e Conduta",
    "Encaminhamento ao Conselho Tutelar",
    "Aplicação de medida socioeducativa interna",
    "Transferência de turno ou turma",
    "Encaminhamento para suporte psicológico/pedagógico",
    "Apenas registro para acompanhamento histórico",
];

pub const STAFF_ROLES: &[&str] = &[
    "Limpeza",
    "Cozinha",
    "Secretária",
    "Biblioteca",
    "Portaria",
    "Apoio",
    "Integrada",
    "Artífice",
    "Mecanografia",
];

/// Role given to staff created through bulk import.
pub const DEFAULT_STAFF_ROLE: &str = "Apoio";

pub fn reasons_for(kind: OccurrenceType) -> &'static [&'static str] {
    match kind {
        OccurrenceType::Pedagogical => PEDAGOGICAL_REASONS,
        OccurrenceType::Behavioral => BEHAVIORAL_REASONS,
        OccurrenceType::Serious => SERIOUS_REASONS,
    }
}

pub fn reason_allowed(kind: OccurrenceType, reason: &str) -> bool {
    reasons_for(kind).iter().any(|r| *r == reason)
}

pub fn staff_role_allowed(role: &str) -> bool {
    STAFF_ROLES.iter().any(|r| *r == role)
}

/// Option lists the interface needs to populate its forms.
pub fn catalog_json() -> serde_json::Value {
    let reasons: Vec<serde_json::Value> = OccurrenceType::ALL
        .iter()
        .map(|k| json!({ "type": k, "reasons": reasons_for(*k) }))
        .collect();
    json!({
        "occurrenceTypes": OccurrenceType::ALL,
        "occurrenceNatures": OccurrenceNature::ALL,
        "reasonsByType": reasons,
        "immediateActions": IMMEDIATE_ACTIONS,
        "managementDecisions": MANAGEMENT_DECISIONS,
        "shifts": Shift::ALL,
        "attendanceTypes": AttendanceKind::ALL,
        "staffRoles": STAFF_ROLES,
        "documentCategories": DocumentCategory::ALL,
        "eventTypes": EventKind::ALL,
    })
}
