use lc3::{
    BufferConsole, Flag, Image, Machine, Memory, Ram, Register, RunError, Status, ORIGIN,
};

fn boot(words: &[u16], input: &str) -> Machine<Ram, BufferConsole> {
    let image = Image::from_words(words.to_vec()).unwrap();
    let mut ram = Ram::new();
    image.load_into(&mut ram);
    Machine::new(ram, BufferConsole::with_input(input))
}

#[test]
fn hello_world() {
    let text = "Hello, world!\n";
    let mut words = vec![
        0xE002, // LEA R0, #2
        0xF022, // PUTS
        0xF025, // HALT
    ];
    words.extend(text.bytes().map(u16::from));
    words.push(0);

    let mut machine = boot(&words, "");
    assert_eq!(machine.status(), Status::Ready);
    machine.run().unwrap();

    assert_eq!(machine.status(), Status::Halted);
    assert_eq!(machine.console().visible(), b"Hello, world!\nStopped.\n");
    assert_eq!(machine.console().errors(), "");
}

#[test]
fn countdown_loop() {
    let mut machine = boot(
        &[
            0x5260, // AND R1, R1, #0
            0x1263, // ADD R1, R1, #3
            0x14A1, // loop: ADD R2, R2, #1
            0x127F, // ADD R1, R1, #-1
            0x03FD, // BRp loop
            0xF025, // HALT
        ],
        "",
    );
    machine.run().unwrap();

    let regs = machine.registers();
    assert_eq!(regs.get(Register::R1), 0);
    assert_eq!(regs.get(Register::R2), 3);
    assert_eq!(regs.cond(), Flag::Z);
    assert_eq!(regs.pc(), ORIGIN + 6);
}

#[test]
fn subroutine_call_and_return() {
    let mut machine = boot(
        &[
            0x4802, // JSR double
            0xF021, // OUT
            0xF025, // HALT
            0x1000, // double: ADD R0, R0, R0
            0xC1C0, // RET
        ],
        "",
    );
    machine.registers_mut().set(Register::R0, 0x21);
    machine.run().unwrap();

    assert_eq!(machine.registers().get(Register::R0), 0x42);
    assert_eq!(machine.registers().get(Register::R7), ORIGIN + 1);
    assert_eq!(machine.console().visible(), b"BStopped.\n");
}

#[test]
fn reads_input_until_newline() {
    // Echo characters until a newline is read
    let mut machine = boot(
        &[
            0xF020, // loop: GETC
            0xF021, // OUT
            0x1236, // ADD R1, R0, #-10
            0x0BFC, // BRnp loop
            0xF025, // HALT
        ],
        "ok\nignored",
    );
    machine.run().unwrap();

    assert_eq!(machine.console().output(), b"ok\nStopped.\n");
    assert_eq!(machine.console().remaining_input(), "ignored".len());
}

#[test]
fn fatal_error_stops_program() {
    let mut machine = boot(
        &[
            0x1021, // ADD R0, R0, #1
            0xF0FF, // TRAP xFF
            0x1021, // ADD R0, R0, #1
            0xF025, // HALT
        ],
        "",
    );
    let err = machine.run().unwrap_err();

    assert_eq!(
        err,
        RunError::UnknownTrap {
            addr: ORIGIN + 1,
            vector: 0xFF
        }
    );
    assert_eq!(machine.registers().get(Register::R0), 1);
    assert_eq!(machine.registers().pc(), ORIGIN + 2);
    assert_eq!(machine.console().output(), b"");

    let (_, console, _) = machine.into_parts();
    assert_eq!(
        console.errors(),
        "Error: Unknown trap vector 0xff at address 0x3001\n"
    );
}

#[test]
fn self_modifying_store() {
    // Overwrite the reserved word with HALT before reaching it
    let mut machine = boot(
        &[
            0x2202, // LD R1, #2
            0x3200, // ST R1, #0
            0xD000, // RES, replaced
            0xF025, // HALT
        ],
        "",
    );
    machine.run().unwrap();
    assert_eq!(machine.memory().read(ORIGIN + 2), 0xF025);
}
