use std::fmt;

use super::error::SchedulerError;
use super::scheduler::TaskContext;

/// Resultado de um callback de tarefa
pub type TaskResult = Result<(), SchedulerError>;

/// Callback de tarefa (`on_enter` ou `on_tick`)
///
/// O único argumento é o contexto do escalonador, por onde a tarefa
/// altera a árvore. Qualquer outro estado deve ser capturado pela closure.
pub type TaskFn = Box<dyn FnMut(&mut TaskContext<'_>) -> TaskResult>;

/// Identificador de uma tarefa viva no pool
///
/// Combina o índice do slot com a geração do slot, de modo que um
/// identificador antigo nunca aponte para a tarefa que reutilizou o slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    index: u32,
    generation: u32,
}

impl TaskId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    /// Índice do slot no pool
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Geração do slot no momento em que a tarefa foi criada
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.index, self.generation)
    }
}

/// Definição de uma tarefa a ser instalada no escalonador
///
/// ```ignore
/// let title = Task::new("Título")
///     .on_enter(|ctx| ctx.add_next(Task::new("Demo")).map(|_| ()))
///     .on_tick(|_| Ok(()))
///     .with_timer(300);
/// ```
pub struct Task {
    /// Nome descritivo, usado em logs e erros
    pub name: String,
    /// Ticks até a transição forçada (0 desativa)
    pub timer: i32,
    pub(crate) on_enter: Option<TaskFn>,
    pub(crate) on_tick: Option<TaskFn>,
}

impl Task {
    /// Cria uma tarefa sem callbacks e sem timer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timer: 0,
            on_enter: None,
            on_tick: None,
        }
    }

    /// Define o callback executado uma única vez, quando a tarefa se torna atual
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut TaskContext<'_>) -> TaskResult + 'static,
    {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Define o callback executado a cada tick enquanto a tarefa é atual
    pub fn on_tick<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut TaskContext<'_>) -> TaskResult + 'static,
    {
        self.on_tick = Some(Box::new(f));
        self
    }

    /// Define o timer de transição automática
    pub fn with_timer(mut self, timer: i32) -> Self {
        self.timer = timer;
        self
    }

    pub fn has_enter(&self) -> bool {
        self.on_enter.is_some()
    }

    pub fn has_tick(&self) -> bool {
        self.on_tick.is_some()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("timer", &self.timer)
            .field("on_enter", &self.has_enter())
            .field("on_tick", &self.has_tick())
            .finish()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timer = if self.timer > 0 {
            format!("{} ticks", self.timer)
        } else {
            "desativado".to_string()
        };

        write!(f, "Tarefa \"{}\" - Timer: {}", self.name, timer)
    }
}

/// Slot do pool de tarefas
pub(crate) struct TaskSlot {
    pub used: bool,
    pub generation: u32,
    pub name: String,
    pub on_enter: Option<TaskFn>,
    pub on_tick: Option<TaskFn>,
    pub entered: bool,
    pub timer: i32,
    /// Próxima irmã na fila (pertence a este slot)
    pub next: Option<usize>,
    /// Tarefa pai (apenas navegação)
    pub parent: Option<usize>,
}

impl TaskSlot {
    pub fn empty() -> Self {
        Self {
            used: false,
            generation: 0,
            name: String::new(),
            on_enter: None,
            on_tick: None,
            entered: false,
            timer: 0,
            next: None,
            parent: None,
        }
    }

    /// Ocupa o slot com uma nova definição de tarefa
    pub fn claim(&mut self, task: Task) {
        self.used = true;
        self.name = task.name;
        self.on_enter = task.on_enter;
        self.on_tick = task.on_tick;
        self.entered = false;
        self.timer = task.timer;
        self.next = None;
        self.parent = None;
    }

    /// Libera o slot e invalida identificadores antigos
    pub fn release(&mut self) {
        self.used = false;
        self.generation = self.generation.wrapping_add(1);
        self.name = String::new();
        self.on_enter = None;
        self.on_tick = None;
        self.entered = false;
        self.timer = 0;
        self.next = None;
        self.parent = None;
    }

    pub fn id(&self, index: usize) -> TaskId {
        TaskId::new(index, self.generation)
    }
}

/// Visão somente-leitura de uma tarefa viva
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: String,
    pub timer: i32,
    pub entered: bool,
    /// Quantidade de irmãs aguardando na fila `next`
    pub queued: usize,
}
