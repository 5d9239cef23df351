// Déclaration des sous-commandes disponibles dans le CLI

pub mod rules;
pub mod run;
