//! # Límite de Conexiones
//! src/server/limit.rs
//!
//! Contador de conexiones activas con un tope opcional. El accept loop pide
//! un [`Permit`] antes de aceptar; si el tope está lleno se bloquea hasta
//! que un worker termine y suelte el suyo.
//!
//! Con `max == 0` nunca bloquea, solo cuenta.

use std::sync::{Condvar, Mutex};

/// Tope de conexiones atendidas a la vez
#[derive(Debug)]
pub struct ConnectionLimit {
    /// Conexiones activas
    active: Mutex<usize>,

    /// Notifica cuando se libera un lugar
    condvar: Condvar,

    /// Máximo (0 = sin límite)
    max: usize,
}

impl ConnectionLimit {
    pub fn new(max: usize) -> Self {
        Self {
            active: Mutex::new(0),
            condvar: Condvar::new(),
            max,
        }
    }

    /// Toma un lugar, esperando si no hay
    pub fn acquire(&self) -> Permit<'_> {
        let mut active = self.active.lock().unwrap();

        while self.max > 0 && *active >= self.max {
            active = self.condvar.wait(active).unwrap();
        }

        *active += 1;
        Permit { limit: self }
    }

    /// Conexiones activas en este momento
    pub fn active(&self) -> usize {
        *self.active.lock().unwrap()
    }

    /// Tope configurado (0 = sin límite)
    pub fn max(&self) -> usize {
        self.max
    }

    fn release(&self) {
        let mut active = self.active.lock().unwrap();
        *active -= 1;
        self.condvar.notify_one();
    }
}

/// Lugar ocupado; se libera al hacer drop
#[derive(Debug)]
pub struct Permit<'a> {
    limit: &'a ConnectionLimit,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.limit.release();
    }
}
