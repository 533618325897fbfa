//! Encodage du protocole de contrôle AMCP (lignes texte sur TCP).
//!
//! Seul sous-ensemble utilisé par la régie : gabarits (CG ADD / UPDATE /
//! INVOKE / PLAY / STOP), médias (PLAY, [HTML]), gestion de couches
//! (CLEAR, SWAP) et inventaire (CLS).

use std::collections::HashSet;

use crate::error::{RenderError, Result};

/// Réponse du renderer : code + lignes de données éventuelles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub data: Vec<String>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Parse la ligne d'en-tête d'une réponse (`202 PLAY OK`).
pub fn parse_reply_header(line: &str) -> Result<u16> {
    let code_token = line.split_whitespace().next().unwrap_or("");
    code_token
        .parse::<u16>()
        .map_err(|_| RenderError::BadReply(line.to_string()))
}

/// Nombre de lignes de données attendues après l'en-tête :
/// 200 = bloc terminé par une ligne vide, 201 = une ligne, sinon aucune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyBody {
    None,
    SingleLine,
    UntilEmptyLine,
}

pub fn reply_body(code: u16) -> ReplyBody {
    match code {
        200 => ReplyBody::UntilEmptyLine,
        201 => ReplyBody::SingleLine,
        _ => ReplyBody::None,
    }
}

/// Échappe une valeur placée entre guillemets dans une commande.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

pub fn cg_add(channel: u16, layer: u16, template: &str, data: &serde_json::Value) -> String {
    format!(
        "CG {}-{} ADD 1 \"{}\" 1 \"{}\"",
        channel,
        layer,
        template,
        escape(&data.to_string())
    )
}

pub fn cg_update(channel: u16, layer: u16, data: &serde_json::Value) -> String {
    format!(
        "CG {}-{} UPDATE 1 \"{}\"",
        channel,
        layer,
        escape(&data.to_string())
    )
}

pub fn cg_invoke_jump(channel: u16, layer: u16, slide: usize) -> String {
    format!("CG {}-{} INVOKE 1 \"jump({})\"", channel, layer, slide)
}

pub fn cg_play(channel: u16, layer: u16) -> String {
    format!("CG {}-{} PLAY 1", channel, layer)
}

pub fn cg_stop(channel: u16, layer: u16) -> String {
    format!("CG {}-{} STOP 1", channel, layer)
}

pub fn play_clip(channel: u16, layer: u16, clip: &str, transition_frames: u32) -> String {
    format!(
        "PLAY {}-{} \"{}\" MIX {}",
        channel,
        layer,
        escape(clip),
        transition_frames
    )
}

pub fn play_url(channel: u16, layer: u16, url: &str) -> String {
    format!("PLAY {}-{} [HTML] \"{}\"", channel, layer, escape(url))
}

pub fn clear(channel: u16, layer: u16) -> String {
    format!("CLEAR {}-{}", channel, layer)
}

pub fn swap(channel: u16, layer_a: u16, layer_b: u16) -> String {
    format!("SWAP {}-{} {}-{} TRANSFORMS", channel, layer_a, channel, layer_b)
}

pub fn cls() -> String {
    "CLS".to_string()
}

/// Extrait les noms de clips d'une réponse CLS.
///
/// Chaque ligne a la forme `"AMB/INTRO"  MOVIE  1234 20240101 250 1/25` ;
/// seul le premier token entre guillemets nous intéresse.
pub fn parse_cls_body(lines: &[String]) -> HashSet<String> {
    lines
        .iter()
        .filter_map(|line| {
            let rest = line.strip_prefix('"')?;
            let end = rest.find('"')?;
            Some(rest[..end].to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cg_add_embeds_escaped_json() {
        let data = serde_json::json!({"caption": "Psalm \"23\""});
        let cmd = cg_add(1, 19, "psalm", &data);
        assert!(cmd.starts_with("CG 1-19 ADD 1 \"psalm\" 1 \""));
        assert!(cmd.contains("\\\"23\\\""));
    }

    #[test]
    fn test_layer_commands() {
        assert_eq!(clear(1, 20), "CLEAR 1-20");
        assert_eq!(swap(1, 20, 19), "SWAP 1-20 1-19 TRANSFORMS");
        assert_eq!(cg_invoke_jump(1, 20, 3), "CG 1-20 INVOKE 1 \"jump(3)\"");
        assert_eq!(
            play_clip(2, 19, "AMB/INTRO", 12),
            "PLAY 2-19 \"AMB/INTRO\" MIX 12"
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape("l1\r\nl2"), "l1\\nl2");
    }

    #[test]
    fn test_parse_reply_header() {
        assert_eq!(parse_reply_header("202 PLAY OK").unwrap(), 202);
        assert_eq!(parse_reply_header("404 PLAY FAILED").unwrap(), 404);
        assert!(parse_reply_header("garbage").is_err());
    }

    #[test]
    fn test_reply_body_classification() {
        assert_eq!(reply_body(200), ReplyBody::UntilEmptyLine);
        assert_eq!(reply_body(201), ReplyBody::SingleLine);
        assert_eq!(reply_body(202), ReplyBody::None);
        assert_eq!(reply_body(404), ReplyBody::None);
    }

    #[test]
    fn test_parse_cls_body() {
        let lines = vec![
            "\"AMB/INTRO\"  MOVIE  1135 20240101 250 1/25".to_string(),
            "\"ANNONCES_P01\"  STILL  42 20240101 0 0/0".to_string(),
            "not a clip line".to_string(),
        ];
        let clips = parse_cls_body(&lines);
        assert_eq!(clips.len(), 2);
        assert!(clips.contains("AMB/INTRO"));
        assert!(clips.contains("ANNONCES_P01"));
    }
}
