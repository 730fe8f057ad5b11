//! # Ring Buffer
//! src/queue/ring.rs
//!
//! Arreglo de tamaño fijo con índices circulares y un contador de largo.
//! El contador evita la ambigüedad lleno/vacío cuando `head == tail`.
//!
//! No está sincronizado: [`super::ConnectionQueue`] lo protege con su mutex.

/// Buffer circular de capacidad fija
pub struct RingBuffer<T> {
    /// Slots del arreglo (None = libre)
    slots: Vec<Option<T>>,

    /// Próxima posición a leer
    head: usize,

    /// Próxima posición a escribir
    tail: usize,

    /// Elementos almacenados actualmente
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Crea un buffer vacío con `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Inserta al final. Si está lleno devuelve el elemento sin tocar nada.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;

        Ok(())
    }

    /// Saca el elemento más antiguo
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;

        item
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
