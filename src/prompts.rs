//! Instruction templates for the five classification tasks.
//! Each task pins its answer to named JSON keys; see `llm::types`.

use crate::codes::ClaimTypeCode;

pub const SYSTEM_PROMPT: &str = r#"
Du bist ein intelligenter Assistent in der Schadenbearbeitung einer Versicherung.
Lies das nachfolgende Dokument aufmerksam und führe anschließend die Anweisungen exakt aus.
Gib die Antwort ausschließlich als JSON zurück.
"#;

pub const CLAIM_TYPE_INSTRUCTIONS: &str = r#"
<instructions>
- Ordne das obige Dokument der am besten passenden Schaden-Kategorie zu.
  Kategorien: [Leitungswasser, Sturm, Feuer, Elementar, Diebstahl, Glas, Sonstige]
- Gib unter dem key 'answer' ausschließlich das Kürzel der Kategorie zurück,
  ohne Leerzeichen oder Sonderzeichen.
  Kürzel: Leitungswasser = 'LW', Sturm = 'ST', Feuer = 'FE', Elementar = 'EL',
  Diebstahl = 'ED', Glas = 'GL', Sonstige = 'Other'
</instructions>
"#;

pub const NOTIFIER_INSTRUCTIONS: &str = r#"
<instructions>
- Bestimme, wer den Schaden gemeldet hat.
  Kategorien: [Versicherungsnehmer, Außendienstler, Sonstige]
- Gib unter dem key 'answer' ausschließlich das Kürzel der Kategorie zurück,
  ohne Leerzeichen oder Sonderzeichen.
  Kürzel: Versicherungsnehmer = 'VN', Außendienstler = 'AD', Sonstige = 'Other'
</instructions>
"#;

pub const OBJECT_INSTRUCTIONS: &str = r#"
<instructions>
- Bestimme, welche Objekt-Kategorie am besten zum Schaden passt.
  Kategorien: [Glas, Hausrat, Wohngebäude, Kasko, Kraftfahrthaftpflicht, Sonstige]
- Gib unter dem key 'answer' ausschließlich das Kürzel der Kategorie zurück,
  ohne Leerzeichen oder Sonderzeichen.
  Kürzel: Glas = 'GL', Hausrat = 'HR', Wohngebäude = 'WG', Kasko = 'KF',
  Kraftfahrthaftpflicht = 'KH', Sonstige = 'Other'
- Hinweis: Ein Fahrraddiebstahl fällt in die Kategorie 'Hausrat'.
</instructions>
"#;

pub const DATE_INSTRUCTIONS: &str = r#"
Lies den Schadenbericht und gib ein JSON mit deinem Denkprozess und dem Schadensdatum zurück.

<instructions>
- Die Antwort enthält keine einleitenden Sätze, ausschließlich JSON.
- Das JSON enthält die keys 'Thinking' und 'Date', in dieser Reihenfolge.
- Begründe unter 'Thinking', welche Daten im Text genannt werden und welches davon der Schadentag ist.
- Gib unter 'Date' das Datum im Format TT.MM.JJJJ zurück.
- Kommen mehrere aufeinanderfolgende Tage als Schadentag in Frage, wähle immer den frühesten.
- Eingangs- oder Versanddaten der Meldung sind kein Schadentag.
- Lässt sich kein Schadentag bestimmen, gib unter 'Date' den Wert 'None' zurück.
</instructions>

<example_1>
Sehr geehrte Damen und Herren, unser gemeinsamer Kunde informierte mich über einen
Fahrraddiebstahl. Eingangszeitpunkt: 08.04.2024 09:29:49

{"Thinking": "Es wird ein Fahrraddiebstahl gemeldet, aber nicht, wann er passiert ist. Das Eingangsdatum ist kein Schadentag.", "Date": "None"}
</example_1>

<example_2>
Anbei die Schadensmeldung zum Sturmschaden kurz vor Ostern. Der Regenhut vom Schornstein
wurde weggeweht, es muss am 21. oder 22. März 2024 gewesen sein.

{"Thinking": "Der Sturm war am 21.03.2024 oder am 22.03.2024. Bei aufeinanderfolgenden Tagen gilt der früheste.", "Date": "21.03.2024"}
</example_2>
"#;

/// Cause question for a document already classified as `claim_type`.
pub fn cause_instructions(claim_type: ClaimTypeCode, labels: &[String]) -> String {
    let options = labels
        .iter()
        .map(|l| format!("'{}'", l))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Dieses Dokument wurde in die Schaden-Kategorie '{}' klassifiziert.\n\n\
        <instructions>\n\
        - Bestimme die zugehörige Schaden-Ursache aus den folgenden Kategorien: [{}]\n\
        - Gib unter dem key 'answer' ausschließlich den Begriff aus der Liste zurück, \
        exakt wie geschrieben und ohne zusätzliche Leerzeichen.\n\
        </instructions>",
        claim_type, options
    )
}
