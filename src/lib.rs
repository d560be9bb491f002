//! Escalonador cooperativo em árvore de tarefas
//!
//! Todas as fases não tempo-real do programa (menus, fases, fim de jogo,
//! demonstração) rodam como uma hierarquia de tarefas retomáveis, avançada
//! uma vez por frame pelo loop principal.

pub mod kernel;
pub mod simulation;
pub mod tasks;
pub mod utils;
