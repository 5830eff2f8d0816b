//! Fixed prompt text for the assistant.

/// System instruction for the assistant, grounded on `context`.
///
/// The assistant is asked to answer only from the station data, to explain
/// categories and health risks, and to say when something isn't available.
pub fn system_prompt(context: &str) -> String {
    format!(
        "Eres un especialista en monitoreo ambiental y calidad del aire de CORNARE \
(Corporación Autónoma Regional del Centro de Antioquia).

Tienes experiencia en:
- Análisis de calidad del aire y contaminantes atmosféricos
- Interpretación de índices de calidad ambiental
- Parámetros meteorológicos y su impacto en la salud
- Material particulado (PM2.5, PM10), gases como NO₂, O₃, CO, SO₂
- Compuestos como H₂S, NH₃, VOC
- Mediciones de ruido ambiental

Responde preguntas basándote únicamente en los siguientes datos de la estación:

{context}

INSTRUCCIONES:
- Proporciona respuestas claras, técnicas pero comprensibles
- Interpreta los valores según estándares de calidad del aire
- Explica qué significan las categorías (Buena, Moderada, etc.)
- Si un valor indica riesgo para la salud, menciónalo
- Si no tienes información específica, menciona que no está disponible
- Usa unidades de medida apropiadas cuando sea relevante
- Relaciona los datos con posibles impactos ambientales o de salud cuando sea apropiado"
    )
}

/// Canned questions offered next to the free-text field.
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "¿Cuál es la calidad del aire actual en esta estación?",
    "¿Qué parámetros están en estado de alerta?",
    "¿Cuáles son los valores de PM2.5 y PM10?",
    "¿Cómo están los niveles de ozono y dióxido de nitrógeno?",
    "¿Cuáles son las condiciones meteorológicas actuales?",
    "¿Hay algún contaminante que supere los límites normales?",
    "Compara los valores de material particulado",
    "¿Qué significa el índice de cada sensor?",
    "¿Dónde exactamente está ubicada esta estación?",
    "Resume el estado ambiental general de la zona",
];

/// Suggested question by 1-based position.
pub fn suggested_question(number: usize) -> Option<&'static str> {
    number.checked_sub(1).and_then(|i| SUGGESTED_QUESTIONS.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_full_context() {
        let context = "INFORMACIÓN GENERAL DE LA ESTACIÓN:\n- ID: 7\n";
        let prompt = system_prompt(context);
        assert!(prompt.contains(context));
        assert!(prompt.starts_with("Eres un especialista"));
        assert!(prompt.contains("INSTRUCCIONES:"));
    }

    #[test]
    fn test_system_prompt_names_the_corporation() {
        let prompt = system_prompt("");
        assert!(prompt.contains("CORNARE (Corporación Autónoma Regional del Centro de Antioquia)."));
    }

    #[test]
    fn test_suggested_questions_are_numbered_from_one() {
        assert_eq!(SUGGESTED_QUESTIONS.len(), 10);
        assert_eq!(suggested_question(1), Some(SUGGESTED_QUESTIONS[0]));
        assert_eq!(suggested_question(10), Some(SUGGESTED_QUESTIONS[9]));
        assert_eq!(suggested_question(0), None);
        assert_eq!(suggested_question(11), None);
    }
}
