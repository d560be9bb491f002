use thiserror::Error;

/// Erros fatais do escalonador
///
/// Todos indicam um grafo de tarefas mal composto pelo código chamador;
/// nenhum deles deve ser tratado com nova tentativa.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Não há slot livre no pool de tarefas
    #[error("Pool de tarefas esgotado ({capacity} slots)")]
    PoolExhausted { capacity: usize },

    /// `next()` chamado sem irmã na fila e sem tarefa pai
    #[error("Nenhuma tarefa na fila após \"{task}\"")]
    NoTaskQueued { task: String },

    /// `parent()` chamado em uma tarefa sem pai
    #[error("Tarefa \"{task}\" não possui tarefa pai")]
    NoParent { task: String },

    /// Operação executada antes de qualquer `set_root()`
    #[error("Nenhuma tarefa atual: o escalonador não foi inicializado")]
    NoCurrentTask,
}

impl SchedulerError {
    /// Indica se o erro é uma falha de alocação (pool esgotado)
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, SchedulerError::PoolExhausted { .. })
    }
}
