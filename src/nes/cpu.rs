use super::opcodes::{AddressingMode, Instruction, Opcode, decode};
use super::{
    FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT, FLAG_NEGATIVE, FLAG_OVERFLOW,
    FLAG_UNUSED, FLAG_ZERO, Nes,
};

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

const INTERRUPT_CYCLES: u32 = 7;

impl Nes {
    /// Executes one instruction (or a pending interrupt), reports the
    /// consumed cycles to the bus, and returns them. Unofficial opcodes
    /// execute as two-cycle NOPs.
    pub fn step(&mut self) -> u32 {
        if self.mapper.is_none() {
            return 0;
        }

        self.base_cycles = 0;
        self.penalty_cycles = 0;

        if self.pending_nmi {
            self.pending_nmi = false;
            self.service_nmi();
            self.tick(INTERRUPT_CYCLES);
            return INTERRUPT_CYCLES;
        }

        if self.pending_irq && !self.get_flag(FLAG_INTERRUPT) {
            self.pending_irq = false;
            self.service_irq();
            self.tick(INTERRUPT_CYCLES);
            return INTERRUPT_CYCLES;
        }

        self.debug.cpu_steps = self.debug.cpu_steps.wrapping_add(1);

        let opcode_pc = self.pc;
        let opcode = self.fetch_byte();
        match decode(opcode) {
            Some(op) => {
                self.base_cycles = op.cycles;
                self.execute(op);
            }
            None => {
                self.note_unknown_opcode(opcode, opcode_pc);
                self.base_cycles = 2;
            }
        }

        let total = self.base_cycles + self.penalty_cycles;
        self.tick(total);
        total
    }

    ////////////////////
    // Interrupts
    ////////////////////

    pub(crate) fn service_nmi(&mut self) {
        self.push_u16(self.pc);
        self.push((self.p & !FLAG_BREAK) | FLAG_UNUSED);
        self.set_flag(FLAG_INTERRUPT, true);
        self.pc = self.read_u16(NMI_VECTOR);
        self.debug.nmi_serviced = self.debug.nmi_serviced.wrapping_add(1);
        self.push_debug_event(format!("NMI serviced -> PC=${:04X}", self.pc));
    }

    pub(crate) fn service_irq(&mut self) {
        self.push_u16(self.pc);
        self.push((self.p & !FLAG_BREAK) | FLAG_UNUSED);
        self.set_flag(FLAG_INTERRUPT, true);
        self.pc = self.read_u16(IRQ_VECTOR);
        self.debug.irq_serviced = self.debug.irq_serviced.wrapping_add(1);
        self.push_debug_event(format!("IRQ serviced -> PC=${:04X}", self.pc));
    }

    ////////////////////
    // Addressing modes
    ////////////////////

    /// Computes the operand's effective address. The second element is
    /// true when an indexed mode stepped over a page boundary; only
    /// read-style instructions turn that into a penalty cycle.
    fn operand_address(&mut self, mode: AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::Immediate | AddressingMode::Relative => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            AddressingMode::ZeroPage => (self.fetch_byte() as u16, false),
            AddressingMode::ZeroPageX => {
                let addr = self.fetch_byte().wrapping_add(self.x);
                (addr as u16, false)
            }
            AddressingMode::ZeroPageY => {
                let addr = self.fetch_byte().wrapping_add(self.y);
                (addr as u16, false)
            }
            AddressingMode::Absolute => (self.fetch_word(), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word();
                let addr = base.wrapping_add(self.x as u16);
                (addr, Self::page_crossed(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word();
                let addr = base.wrapping_add(self.y as u16);
                (addr, Self::page_crossed(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word();
                (self.read_u16_bug(ptr), false)
            }
            AddressingMode::IndirectX => {
                let zp = self.fetch_byte().wrapping_add(self.x);
                (self.read_zp_u16(zp), false)
            }
            AddressingMode::IndirectY => {
                let zp = self.fetch_byte();
                let base = self.read_zp_u16(zp);
                let addr = base.wrapping_add(self.y as u16);
                (addr, Self::page_crossed(base, addr))
            }
            AddressingMode::Accumulator | AddressingMode::Implied => (0, false),
        }
    }

    /// Fetches the operand value, charging the page-cross penalty. Used by
    /// every read-style instruction; stores and read-modify-writes go
    /// through `operand_address` and keep their fixed cycle counts.
    fn fetch_operand(&mut self, mode: AddressingMode) -> u8 {
        let (addr, page_crossed) = self.operand_address(mode);
        if page_crossed {
            self.penalty_cycles += 1;
        }
        self.cpu_read(addr)
    }

    /// 16-bit pointer fetch that never leaves the zero page.
    fn read_zp_u16(&mut self, addr: u8) -> u16 {
        let lo = self.cpu_read(addr as u16) as u16;
        let hi = self.cpu_read(addr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    fn page_crossed(base: u16, addr: u16) -> bool {
        (base & 0xFF00) != (addr & 0xFF00)
    }

    ////////////////////
    // Execution
    ////////////////////

    fn execute(&mut self, op: Opcode) {
        match op.instruction {
            Instruction::Adc => {
                let value = self.fetch_operand(op.mode);
                self.adc(value);
            }
            Instruction::Sbc => {
                let value = self.fetch_operand(op.mode);
                self.sbc(value);
            }
            Instruction::And => {
                self.a &= self.fetch_operand(op.mode);
                self.update_zn(self.a);
            }
            Instruction::Ora => {
                self.a |= self.fetch_operand(op.mode);
                self.update_zn(self.a);
            }
            Instruction::Eor => {
                self.a ^= self.fetch_operand(op.mode);
                self.update_zn(self.a);
            }
            Instruction::Bit => {
                let value = self.fetch_operand(op.mode);
                self.set_flag(FLAG_ZERO, (self.a & value) == 0);
                self.set_flag(FLAG_NEGATIVE, (value & 0x80) != 0);
                self.set_flag(FLAG_OVERFLOW, (value & 0x40) != 0);
            }

            Instruction::Asl => self.rmw(op.mode, RmwOp::Asl),
            Instruction::Lsr => self.rmw(op.mode, RmwOp::Lsr),
            Instruction::Rol => self.rmw(op.mode, RmwOp::Rol),
            Instruction::Ror => self.rmw(op.mode, RmwOp::Ror),
            Instruction::Inc => self.rmw(op.mode, RmwOp::Inc),
            Instruction::Dec => self.rmw(op.mode, RmwOp::Dec),

            Instruction::Cmp => {
                let value = self.fetch_operand(op.mode);
                self.compare(self.a, value);
            }
            Instruction::Cpx => {
                let value = self.fetch_operand(op.mode);
                self.compare(self.x, value);
            }
            Instruction::Cpy => {
                let value = self.fetch_operand(op.mode);
                self.compare(self.y, value);
            }

            Instruction::Inx => {
                self.x = self.x.wrapping_add(1);
                self.update_zn(self.x);
            }
            Instruction::Iny => {
                self.y = self.y.wrapping_add(1);
                self.update_zn(self.y);
            }
            Instruction::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.update_zn(self.x);
            }
            Instruction::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.update_zn(self.y);
            }

            Instruction::Lda => {
                self.a = self.fetch_operand(op.mode);
                self.update_zn(self.a);
            }
            Instruction::Ldx => {
                self.x = self.fetch_operand(op.mode);
                self.update_zn(self.x);
            }
            Instruction::Ldy => {
                self.y = self.fetch_operand(op.mode);
                self.update_zn(self.y);
            }

            // Indexed stores never take the page-cross penalty.
            Instruction::Sta => {
                let (addr, _) = self.operand_address(op.mode);
                self.cpu_write(addr, self.a);
            }
            Instruction::Stx => {
                let (addr, _) = self.operand_address(op.mode);
                self.cpu_write(addr, self.x);
            }
            Instruction::Sty => {
                let (addr, _) = self.operand_address(op.mode);
                self.cpu_write(addr, self.y);
            }

            Instruction::Bcc => self.branch(!self.get_flag(FLAG_CARRY)),
            Instruction::Bcs => self.branch(self.get_flag(FLAG_CARRY)),
            Instruction::Bne => self.branch(!self.get_flag(FLAG_ZERO)),
            Instruction::Beq => self.branch(self.get_flag(FLAG_ZERO)),
            Instruction::Bpl => self.branch(!self.get_flag(FLAG_NEGATIVE)),
            Instruction::Bmi => self.branch(self.get_flag(FLAG_NEGATIVE)),
            Instruction::Bvc => self.branch(!self.get_flag(FLAG_OVERFLOW)),
            Instruction::Bvs => self.branch(self.get_flag(FLAG_OVERFLOW)),

            Instruction::Jmp => {
                let (addr, _) = self.operand_address(op.mode);
                self.pc = addr;
            }
            Instruction::Jsr => {
                let addr = self.fetch_word();
                self.push_u16(self.pc.wrapping_sub(1));
                self.pc = addr;
            }
            Instruction::Rts => {
                self.pc = self.pop_u16().wrapping_add(1);
            }
            Instruction::Brk => {
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(self.pc);
                self.push(self.p | FLAG_BREAK | FLAG_UNUSED);
                self.set_flag(FLAG_INTERRUPT, true);
                self.pc = self.read_u16(IRQ_VECTOR);
            }
            Instruction::Rti => {
                self.p = (self.pop() & !FLAG_BREAK) | FLAG_UNUSED;
                self.pc = self.pop_u16();
            }

            Instruction::Pha => self.push(self.a),
            Instruction::Php => self.push(self.p | FLAG_BREAK | FLAG_UNUSED),
            Instruction::Pla => {
                self.a = self.pop();
                self.update_zn(self.a);
            }
            Instruction::Plp => {
                self.p = (self.pop() & !FLAG_BREAK) | FLAG_UNUSED;
            }

            Instruction::Clc => self.set_flag(FLAG_CARRY, false),
            Instruction::Sec => self.set_flag(FLAG_CARRY, true),
            Instruction::Cli => self.set_flag(FLAG_INTERRUPT, false),
            Instruction::Sei => self.set_flag(FLAG_INTERRUPT, true),
            Instruction::Clv => self.set_flag(FLAG_OVERFLOW, false),
            Instruction::Cld => self.set_flag(FLAG_DECIMAL, false),
            Instruction::Sed => self.set_flag(FLAG_DECIMAL, true),

            Instruction::Tax => {
                self.x = self.a;
                self.update_zn(self.x);
            }
            Instruction::Tay => {
                self.y = self.a;
                self.update_zn(self.y);
            }
            Instruction::Txa => {
                self.a = self.x;
                self.update_zn(self.a);
            }
            Instruction::Tya => {
                self.a = self.y;
                self.update_zn(self.a);
            }
            Instruction::Tsx => {
                self.x = self.sp;
                self.update_zn(self.x);
            }
            Instruction::Txs => {
                self.sp = self.x;
            }

            Instruction::Nop => {}
        }
    }

    ////////////////////
    // Instruction helpers
    ////////////////////

    fn branch(&mut self, condition: bool) {
        let offset = self.fetch_byte();
        if condition {
            self.penalty_cycles += 1;
            let target = self.pc.wrapping_add(offset as i8 as u16);
            if Self::page_crossed(self.pc, target) {
                self.penalty_cycles += 1;
            }
            self.pc = target;
        }
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.set_flag(FLAG_CARRY, register >= value);
        self.update_zn(result);
    }

    fn adc(&mut self, value: u8) {
        let carry_in = u16::from(self.get_flag(FLAG_CARRY));
        let result = self.a as u16 + value as u16 + carry_in;
        let out = result as u8;

        self.set_flag(FLAG_CARRY, result > 0xFF);
        self.set_flag(FLAG_OVERFLOW, ((self.a ^ out) & (value ^ out) & 0x80) != 0);

        self.a = out;
        self.update_zn(self.a);
    }

    // The decimal flag is ignored; this hardware variant has no BCD mode.
    fn sbc(&mut self, value: u8) {
        self.adc(value ^ 0xFF);
    }

    fn rmw(&mut self, mode: AddressingMode, op: RmwOp) {
        if mode == AddressingMode::Accumulator {
            self.a = self.apply_rmw(op, self.a);
            return;
        }

        let (addr, _) = self.operand_address(mode);
        let value = self.cpu_read(addr);
        let out = self.apply_rmw(op, value);
        self.cpu_write(addr, out);
    }

    fn apply_rmw(&mut self, op: RmwOp, value: u8) -> u8 {
        let result = match op {
            RmwOp::Asl => {
                self.set_flag(FLAG_CARRY, (value & 0x80) != 0);
                value << 1
            }
            RmwOp::Lsr => {
                self.set_flag(FLAG_CARRY, (value & 0x01) != 0);
                value >> 1
            }
            RmwOp::Rol => {
                let carry_in = u8::from(self.get_flag(FLAG_CARRY));
                self.set_flag(FLAG_CARRY, (value & 0x80) != 0);
                (value << 1) | carry_in
            }
            RmwOp::Ror => {
                let carry_in = if self.get_flag(FLAG_CARRY) { 0x80 } else { 0 };
                self.set_flag(FLAG_CARRY, (value & 0x01) != 0);
                (value >> 1) | carry_in
            }
            RmwOp::Inc => value.wrapping_add(1),
            RmwOp::Dec => value.wrapping_sub(1),
        };
        self.update_zn(result);
        result
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RmwOp {
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
}
