/// LC3 can address 128KB of memory.
pub const MEMORY_SIZE: usize = 0x10000;

/// Word-addressed store the machine fetches instructions and data from.
///
/// All I/O goes through traps, so there is no notion of memory-mapped devices here.
pub trait Memory {
    fn read(&self, address: u16) -> u16;
    fn write(&mut self, address: u16, value: u16);
    /// Amount of addressable cells.
    fn size(&self) -> usize {
        MEMORY_SIZE
    }
}

/// Default memory, covering every address a `u16` can hold.
pub struct Ram {
    mem: Box<[u16; MEMORY_SIZE]>,
}

impl Ram {
    pub fn new() -> Self {
        // Built on the heap, a 128KB array can overflow the stack in debug builds
        let mem = vec![0u16; MEMORY_SIZE]
            .into_boxed_slice()
            .try_into()
            .unwrap_or_else(|_| unreachable!("vector was allocated with `MEMORY_SIZE` cells"));
        Self { mem }
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for Ram {
    #[inline]
    fn read(&self, address: u16) -> u16 {
        self.mem[address as usize]
    }

    #[inline]
    fn write(&mut self, address: u16, value: u16) {
        self.mem[address as usize] = value;
    }

    fn size(&self) -> usize {
        MEMORY_SIZE
    }
}
