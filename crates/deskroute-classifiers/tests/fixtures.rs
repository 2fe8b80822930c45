//! Shared training fixtures
//!
//! A small labeled support-request corpus in the shape of the training
//! dataset, plus the rule table that goes with it.

#![allow(dead_code)]

use deskroute_classifiers::RuleTable;
use deskroute_core::LabeledText;

pub const RULES_JSON: &str = r#"{
    "access": ["пароль", "войти", "логин", "доступ"],
    "software": ["1С", "SAP", "программа", "установить"],
    "hardware": ["принтер", "монитор", "мышь", "клавиатура"],
    "network": ["интернет", "wi-fi", "vpn", "сеть"]
}"#;

pub fn rules() -> RuleTable {
    RuleTable::from_json(RULES_JSON).unwrap()
}

pub fn samples() -> Vec<LabeledText> {
    [
        ("Не могу войти в систему", "access"),
        ("Забыл пароль от почты", "access"),
        ("Нет доступа к папке отдела", "access"),
        ("Сбросьте пароль пожалуйста", "access"),
        ("SAP не подключается к базе", "software"),
        ("Программа 1С не запускается", "software"),
        ("Нужно установить программу для отчетов", "software"),
        ("1С выдает ошибку при проведении", "software"),
        ("Принтер не печатает", "hardware"),
        ("Сломался монитор на рабочем месте", "hardware"),
        ("Не работает мышь и клавиатура", "hardware"),
        ("Принтер зажевал бумагу", "hardware"),
        ("Нет интернета в офисе", "network"),
        ("Не подключается VPN из дома", "network"),
        ("Пропал wi-fi на этаже", "network"),
        ("Медленная сеть в переговорной", "network"),
    ]
    .into_iter()
    .map(|(text, category)| LabeledText::new(text, category))
    .collect()
}

pub fn texts_and_labels() -> (Vec<String>, Vec<String>) {
    samples().into_iter().map(|s| (s.text, s.category)).unzip()
}
