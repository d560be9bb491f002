use super::error::SchedulerError;
use super::task::{Task, TaskId, TaskInfo, TaskResult, TaskSlot};

/// Capacidade padrão do pool de tarefas
pub const DEFAULT_CAPACITY: usize = 64;

/// Resumo do que aconteceu durante um `run_once()`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Número do frame processado (começa em 0)
    pub frame: u64,
    /// Quantos callbacks `on_enter` rodaram na resolução de entrada
    pub entered: u32,
    /// Tarefa cujo `on_tick` foi executado
    pub ticked: Option<String>,
    /// Tarefa cujo timer expirou neste tick
    pub expired: Option<String>,
}

/// Escalonador cooperativo em árvore de tarefas
///
/// Mantém um pool de capacidade fixa e uma única tarefa atual. Cada chamada
/// de [`Scheduler::run_once`] resolve as entradas pendentes, executa o
/// `on_tick` da tarefa atual e varre os timers dos ancestrais.
pub struct Scheduler {
    pool: Vec<TaskSlot>,
    /// Slots livres, o próximo a ser usado fica no fim
    free: Vec<usize>,
    current: Option<usize>,
    frame: u64,
}

/// Capacidade entregue aos callbacks para alterar a árvore de tarefas
pub struct TaskContext<'a> {
    scheduler: &'a mut Scheduler,
}

impl Scheduler {
    /// Cria um escalonador com [`DEFAULT_CAPACITY`] slots
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Cria um escalonador com capacidade fixa
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: (0..capacity).map(|_| TaskSlot::empty()).collect(),
            free: (0..capacity).rev().collect(),
            current: None,
            frame: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.pool.len()
    }

    /// Quantidade de slots ocupados
    pub fn live_count(&self) -> usize {
        self.pool.len() - self.free.len()
    }

    /// Quantidade de ticks já processados
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn current(&self) -> Option<TaskId> {
        self.current.map(|index| self.pool[index].id(index))
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.map(|index| self.pool[index].name.as_str())
    }

    /// Verifica se o identificador ainda aponta para uma tarefa viva
    pub fn is_live(&self, id: TaskId) -> bool {
        self.pool
            .get(id.index())
            .is_some_and(|slot| slot.used && slot.generation == id.generation())
    }

    /// Comprimento do caminho da tarefa atual até a raiz
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Caminho da tarefa atual até a raiz, a atual primeiro
    pub fn path(&self) -> Vec<TaskInfo> {
        self.ancestors()
            .map(|index| {
                let slot = &self.pool[index];
                TaskInfo {
                    id: slot.id(index),
                    name: slot.name.clone(),
                    timer: slot.timer,
                    entered: slot.entered,
                    queued: self.queued_after(index),
                }
            })
            .collect()
    }

    /// Descarta toda a árvore e instala uma nova tarefa raiz
    pub fn set_root(&mut self, task: Task) -> Result<TaskId, SchedulerError> {
        self.free_all();
        let index = self.create(task)?;
        self.current = Some(index);
        log::debug!("Nova raiz: \"{}\"", self.pool[index].name);
        Ok(self.pool[index].id(index))
    }

    /// Processa um frame
    ///
    /// Deve ser chamado exatamente uma vez por frame pelo loop principal.
    /// Qualquer erro retornado é fatal: o grafo de tarefas está mal formado.
    pub fn run_once(&mut self) -> Result<TickReport, SchedulerError> {
        let mut report = TickReport {
            frame: self.frame,
            ..TickReport::default()
        };
        self.frame += 1;

        // Um on_enter pode trocar a tarefa atual; repetir até estabilizar
        loop {
            let index = self.current_index()?;
            let before = self.pool[index].id(index);
            let slot = &self.pool[index];
            if !slot.entered && slot.on_enter.is_some() {
                self.enter(index)?;
                report.entered += 1;
            }
            if self.current() == Some(before) {
                break;
            }
        }

        let index = self.current_index()?;
        if self.pool[index].on_tick.is_some() {
            report.ticked = Some(self.pool[index].name.clone());
            self.tick(index)?;
        }

        report.expired = self.sweep_timers()?;
        log::trace!(
            "Frame {} concluído, tarefa atual: {:?}",
            report.frame,
            self.current_name()
        );
        Ok(report)
    }

    fn ancestors(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.current, |&index| self.pool[index].parent)
    }

    fn queued_after(&self, index: usize) -> usize {
        std::iter::successors(self.pool[index].next, |&next| self.pool[next].next).count()
    }

    fn current_index(&self) -> Result<usize, SchedulerError> {
        self.current.ok_or(SchedulerError::NoCurrentTask)
    }

    fn create(&mut self, task: Task) -> Result<usize, SchedulerError> {
        let Some(index) = self.free.pop() else {
            log::debug!("Pool esgotado ao criar \"{}\"", task.name);
            return Err(SchedulerError::PoolExhausted {
                capacity: self.pool.len(),
            });
        };

        self.pool[index].claim(task);
        log::debug!(
            "Tarefa criada: \"{}\" ({})",
            self.pool[index].name,
            self.pool[index].id(index)
        );
        Ok(index)
    }

    fn release(&mut self, index: usize) {
        self.pool[index].release();
        self.free.push(index);
    }

    /// Libera a tarefa e toda a sua fila de irmãs
    fn free(&mut self, index: usize) {
        let mut link = self.pool[index].next.take();
        while let Some(next) = link {
            link = self.pool[next].next.take();
            self.release(next);
        }
        self.release(index);
    }

    fn free_all(&mut self) {
        let mut cursor = self.current.take();
        while let Some(index) = cursor {
            cursor = self.pool[index].parent;
            self.free(index);
        }
    }

    fn add_next(&mut self, task: Task) -> Result<TaskId, SchedulerError> {
        let mut tail = self.current_index()?;
        while let Some(next) = self.pool[tail].next {
            tail = next;
        }

        let index = self.create(task)?;
        self.pool[index].parent = self.pool[tail].parent;
        self.pool[tail].next = Some(index);
        Ok(self.pool[index].id(index))
    }

    fn add_child(&mut self, task: Task) -> Result<TaskId, SchedulerError> {
        let parent = self.current_index()?;
        let index = self.create(task)?;
        let id = self.pool[index].id(index);
        self.pool[index].parent = Some(parent);
        self.current = Some(index);

        self.enter(index)?;
        Ok(id)
    }

    fn next(&mut self) -> Result<(), SchedulerError> {
        let index = self.current_index()?;
        let slot = &mut self.pool[index];

        let target = if let Some(sibling) = slot.next.take() {
            sibling
        } else if let Some(parent) = slot.parent {
            parent
        } else {
            return Err(SchedulerError::NoTaskQueued {
                task: slot.name.clone(),
            });
        };

        log::debug!(
            "Avançando de \"{}\" para \"{}\"",
            self.pool[index].name,
            self.pool[target].name
        );
        self.current = Some(target);
        self.release(index);
        Ok(())
    }

    fn parent(&mut self) -> Result<(), SchedulerError> {
        let index = self.current_index()?;
        let Some(parent) = self.pool[index].parent else {
            return Err(SchedulerError::NoParent {
                task: self.pool[index].name.clone(),
            });
        };

        log::debug!(
            "Retornando de \"{}\" para \"{}\"",
            self.pool[index].name,
            self.pool[parent].name
        );
        self.free(index);
        self.current = Some(parent);
        Ok(())
    }

    /// Dispara o on_enter da tarefa, que nunca volta ao slot
    fn enter(&mut self, index: usize) -> TaskResult {
        self.pool[index].entered = true;
        let Some(mut on_enter) = self.pool[index].on_enter.take() else {
            return Ok(());
        };

        log::trace!("on_enter: \"{}\"", self.pool[index].name);
        on_enter(&mut TaskContext { scheduler: self })
    }

    fn tick(&mut self, index: usize) -> TaskResult {
        let id = self.pool[index].id(index);
        let Some(mut on_tick) = self.pool[index].on_tick.take() else {
            return Ok(());
        };

        let result = on_tick(&mut TaskContext { scheduler: self });

        // A tarefa pode ter sido liberada (e o slot reaproveitado) durante o callback
        if self.is_live(id) {
            self.pool[index].on_tick = Some(on_tick);
        }
        result
    }

    /// Decrementa os timers do caminho atual e trata a primeira expiração
    fn sweep_timers(&mut self) -> Result<Option<String>, SchedulerError> {
        let Some(current) = self.current else {
            return Ok(None);
        };

        let mut cursor = Some(current);
        while let Some(index) = cursor {
            let slot = &mut self.pool[index];
            cursor = slot.parent;
            if slot.timer <= 0 {
                continue;
            }

            slot.timer -= 1;
            if slot.timer != 0 {
                continue;
            }

            let name = slot.name.clone();
            log::debug!("Timer expirado: \"{}\"", name);

            let mut walk = current;
            while walk != index {
                let parent = self.pool[walk].parent;
                self.free(walk);
                match parent {
                    Some(parent) => walk = parent,
                    None => break,
                }
            }

            self.current = Some(index);
            self.next()?;
            return Ok(Some(name));
        }

        Ok(None)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("capacity", &self.capacity())
            .field("live", &self.live_count())
            .field("current", &self.current_name())
            .field("frame", &self.frame)
            .finish()
    }
}

impl TaskContext<'_> {
    /// Descarta toda a árvore e instala uma nova raiz
    ///
    /// O `on_enter` da nova raiz roda na próxima resolução de entrada.
    pub fn set_root(&mut self, task: Task) -> Result<TaskId, SchedulerError> {
        self.scheduler.set_root(task)
    }

    /// Enfileira uma irmã ao fim da fila da tarefa atual
    pub fn add_next(&mut self, task: Task) -> Result<TaskId, SchedulerError> {
        self.scheduler.add_next(task)
    }

    /// Suspende a tarefa atual e passa o controle a uma filha
    ///
    /// O `on_enter` da filha roda antes desta chamada retornar.
    pub fn add_child(&mut self, task: Task) -> Result<TaskId, SchedulerError> {
        self.scheduler.add_child(task)
    }

    /// Avança para a próxima irmã ou, sem irmã, volta para a tarefa pai
    pub fn next(&mut self) -> TaskResult {
        self.scheduler.next()
    }

    /// Libera a tarefa atual e suas irmãs e volta para a tarefa pai
    pub fn parent(&mut self) -> TaskResult {
        self.scheduler.parent()
    }

    /// Timer restante da tarefa atual
    pub fn timer(&self) -> i32 {
        self.scheduler
            .current
            .map_or(0, |index| self.scheduler.pool[index].timer)
    }

    /// Frame em andamento
    pub fn frame(&self) -> u64 {
        self.scheduler.frame.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    fn recorded(name: &'static str, events: &Events) -> Task {
        let on_enter = Rc::clone(events);
        let on_tick = Rc::clone(events);
        Task::new(name)
            .on_enter(move |_| {
                on_enter.borrow_mut().push(format!("enter:{name}"));
                Ok(())
            })
            .on_tick(move |_| {
                on_tick.borrow_mut().push(format!("tick:{name}"));
                Ok(())
            })
    }

    #[test]
    fn run_once_without_root_fails() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.run_once(), Err(SchedulerError::NoCurrentTask));
    }

    #[test]
    fn enter_runs_before_first_tick() {
        let events = Events::default();
        let mut scheduler = Scheduler::new();
        scheduler.set_root(recorded("A", &events)).unwrap();

        let report = scheduler.run_once().unwrap();
        scheduler.run_once().unwrap();

        assert_eq!(report.entered, 1);
        assert_eq!(report.ticked.as_deref(), Some("A"));
        assert_eq!(*events.borrow(), ["enter:A", "tick:A", "tick:A"]);
    }

    #[test]
    fn add_next_appends_to_tail_with_shared_parent() {
        let mut scheduler = Scheduler::new();
        scheduler
            .set_root(Task::new("P").on_enter(|ctx| {
                ctx.add_child(Task::new("C").on_enter(|ctx| {
                    ctx.add_next(Task::new("C2"))?;
                    ctx.add_next(Task::new("C3"))?;
                    Ok(())
                }))?;
                Ok(())
            }))
            .unwrap();

        scheduler.run_once().unwrap();

        let path = scheduler.path();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].name, "C");
        assert_eq!(path[0].queued, 2);
        assert_eq!(scheduler.live_count(), 4);

        let child = path[0].id.index();
        let c2 = scheduler.pool[child].next.expect("C2 enfileirada");
        assert_eq!(scheduler.pool[c2].parent, Some(path[1].id.index()));
    }

    #[test]
    fn next_releases_only_the_old_slot() {
        let mut scheduler = Scheduler::new();
        scheduler
            .set_root(
                Task::new("A")
                    .on_enter(|ctx| {
                        ctx.add_next(Task::new("B"))?;
                        ctx.add_next(Task::new("C"))?;
                        Ok(())
                    })
                    .on_tick(|ctx| ctx.next()),
            )
            .unwrap();

        scheduler.run_once().unwrap();

        assert_eq!(scheduler.current_name(), Some("B"));
        assert_eq!(scheduler.live_count(), 2);
        assert_eq!(scheduler.path()[0].queued, 1);
    }

    #[test]
    fn stale_id_is_not_live_after_slot_reuse() {
        let mut scheduler = Scheduler::with_capacity(1);
        let first = scheduler.set_root(Task::new("A")).unwrap();
        let second = scheduler.set_root(Task::new("B")).unwrap();

        assert_eq!(first.index(), second.index());
        assert!(!scheduler.is_live(first));
        assert!(scheduler.is_live(second));
    }

    #[test]
    fn tick_callback_is_dropped_when_its_slot_is_reused() {
        let ticks = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&ticks);
        let mut scheduler = Scheduler::with_capacity(1);
        scheduler
            .set_root(Task::new("A").on_tick(move |ctx| {
                *counter.borrow_mut() += 1;
                ctx.set_root(Task::new("B"))?;
                Ok(())
            }))
            .unwrap();

        scheduler.run_once().unwrap();
        scheduler.run_once().unwrap();

        assert_eq!(*ticks.borrow(), 1);
        assert_eq!(scheduler.current_name(), Some("B"));
        assert!(scheduler.pool[0].on_tick.is_none());
    }

    #[test]
    fn parent_without_parent_leaves_tree_untouched() {
        let mut scheduler = Scheduler::new();
        scheduler
            .set_root(Task::new("A").on_tick(|ctx| ctx.parent()))
            .unwrap();

        let err = scheduler.run_once().unwrap_err();

        assert_eq!(err, SchedulerError::NoParent { task: "A".into() });
        assert_eq!(scheduler.live_count(), 1);
        assert_eq!(scheduler.current_name(), Some("A"));
    }

    #[test]
    fn negative_timer_never_expires() {
        let mut scheduler = Scheduler::new();
        scheduler.set_root(Task::new("A").with_timer(-1)).unwrap();

        for _ in 0..10 {
            assert_eq!(scheduler.run_once().unwrap().expired, None);
        }
        assert_eq!(scheduler.path()[0].timer, -1);
    }

    #[test]
    fn own_timer_expiry_advances_to_sibling() {
        let mut scheduler = Scheduler::new();
        scheduler
            .set_root(
                Task::new("A")
                    .with_timer(2)
                    .on_enter(|ctx| ctx.add_next(Task::new("B")).map(|_| ())),
            )
            .unwrap();

        assert_eq!(scheduler.run_once().unwrap().expired, None);
        assert_eq!(scheduler.run_once().unwrap().expired.as_deref(), Some("A"));
        assert_eq!(scheduler.current_name(), Some("B"));
        assert_eq!(scheduler.live_count(), 1);
    }
}
